use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use journal_core::{DateKey, Direction, Navigator};
use journal_crypto::{fernet, JournalKey};

use crate::codec;
use crate::error::{StoreError, StoreResult};

/// A journal file opened with its passphrase, fully decrypted in memory.
///
/// Every successful mutation rewrites the whole file before returning.
pub struct Journal {
    entries: BTreeMap<DateKey, String>,
    path: PathBuf,
    key: JournalKey,
    last_saved: Option<DateTime<Utc>>,
}

impl Journal {
    /// Open the journal at `path`, decrypting every entry.
    ///
    /// A path with no file yet opens as an empty journal; nothing is written
    /// until the first successful save.
    pub fn open(path: impl Into<PathBuf>, passphrase: &str) -> StoreResult<Self> {
        let path = path.into();
        let key = JournalKey::derive(passphrase.as_bytes());

        let properties = match codec::read_file(&path) {
            Ok(properties) => properties,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!("No journal at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut entries = BTreeMap::new();
        let mut last_saved = None;
        for property in properties {
            let date = DateKey::parse(&property.key)
                .map_err(|e| StoreError::format(property.line, e.to_string()))?;
            let text = fernet::decrypt(&property.value, &key)?;
            let written = fernet::extract_timestamp(&property.value, &key)?;
            last_saved = last_saved.max(Some(written));
            entries.insert(date, text);
        }

        tracing::info!("Opened journal {} ({} entries)", path.display(), entries.len());
        Ok(Self {
            entries,
            path,
            key,
            last_saved,
        })
    }

    /// Open a journal that must already exist; a missing file is
    /// [`StoreError::NotFound`] instead of an empty journal.
    pub fn open_existing(path: impl Into<PathBuf>, passphrase: &str) -> StoreResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(StoreError::NotFound(format!("journal file {}", path.display())));
        }
        Self::open(path, passphrase)
    }

    /// Create a new, empty journal file at `path`.
    ///
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub fn create(path: impl Into<PathBuf>, passphrase: &str, overwrite: bool) -> StoreResult<Self> {
        let path = path.into();
        if !overwrite && path.exists() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }

        let mut journal = Self {
            entries: BTreeMap::new(),
            path,
            key: JournalKey::derive(passphrase.as_bytes()),
            last_saved: None,
        };
        journal.persist(true)?;
        tracing::info!("Created journal {}", journal.path.display());
        Ok(journal)
    }

    /// Set the text for `date` and save. Empty text deletes the entry.
    ///
    /// Fails with [`StoreError::EmptyJournal`] rather than writing a file
    /// with no entries. Neither the file nor the in-memory entries change.
    pub fn set_entry(&mut self, date: DateKey, text: impl Into<String>) -> StoreResult<()> {
        let text = text.into();
        let keeps_an_entry =
            !text.is_empty() || self.entries.iter().any(|(d, t)| *d != date && !t.is_empty());
        if !keeps_an_entry {
            tracing::warn!("Empty journal not saved: {}", self.path.display());
            return Err(StoreError::EmptyJournal);
        }
        self.entries.insert(date, text);
        self.save()
    }

    /// Remove the entry for `date` and save. Removing the last entry leaves
    /// an empty journal file.
    pub fn remove_entry(&mut self, date: DateKey) -> StoreResult<String> {
        let removed = self
            .entries
            .remove(&date)
            .ok_or_else(|| StoreError::NotFound(format!("entry for {date}")))?;
        self.persist(true)?;
        Ok(removed)
    }

    /// Prune, encrypt and write every entry.
    pub fn save(&mut self) -> StoreResult<()> {
        self.persist(false)
    }

    pub fn get_entry(&self, date: DateKey) -> StoreResult<&str> {
        self.entries
            .get(&date)
            .map(String::as_str)
            .ok_or_else(|| StoreError::NotFound(format!("entry for {date}")))
    }

    pub fn contains_key(&self, date: DateKey) -> bool {
        self.entries.contains_key(&date)
    }

    /// Dates with entries, ascending.
    pub fn list_keys(&self) -> Vec<DateKey> {
        self.entries.keys().copied().collect()
    }

    /// Entries, ascending by date.
    pub fn list_entries(&self) -> Vec<(DateKey, &str)> {
        self.entries
            .iter()
            .map(|(date, text)| (*date, text.as_str()))
            .collect()
    }

    /// Days of the given month that have a non-empty entry.
    pub fn marked_days(&self, year: i32, month: u32) -> Vec<u32> {
        let Ok(start) = DateKey::from_ymd(year, month, 1) else {
            return Vec::new();
        };
        self.entries
            .range(start..)
            .take_while(|(date, _)| date.year() == year && date.month() == month)
            .filter(|(_, text)| !text.is_empty())
            .map(|(date, _)| date.day())
            .collect()
    }

    /// Resolve a navigation request against the current key set.
    pub fn navigate(&self, navigator: &Navigator, direction: Direction, from: DateKey) -> Option<DateKey> {
        navigator.go(direction, &self.list_keys(), from)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the file was last written, as recorded in its tokens.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    fn prune_empty(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, text| !text.is_empty());
        before - self.entries.len()
    }

    fn persist(&mut self, allow_empty: bool) -> StoreResult<()> {
        let pruned = self.prune_empty();
        if pruned > 0 {
            tracing::debug!("Pruned {pruned} empty entries");
        }
        if self.entries.is_empty() && !allow_empty {
            tracing::warn!("Empty journal not saved: {}", self.path.display());
            return Err(StoreError::EmptyJournal);
        }

        let mut tokens = Vec::with_capacity(self.entries.len());
        for (date, text) in &self.entries {
            tokens.push((date.to_string(), fernet::encrypt(text, &self.key)?));
        }
        codec::write_file(
            &self.path,
            tokens.iter().map(|(date, token)| (date.as_str(), token.as_str())),
        )?;

        self.last_saved = Some(Utc::now());
        tracing::debug!("Saved {} entries to {}", tokens.len(), self.path.display());
        Ok(())
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .field("key", &self.key)
            .finish()
    }
}
