//! One function per subcommand. Store calls block on key derivation and
//! file I/O, so they run on the blocking pool.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use journal_core::{DateKey, Direction, Navigator};
use journal_store::{Journal, StoreError, StoreResult};
use serde::Serialize;

use crate::setup;

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

async fn open(path: PathBuf) -> Result<Journal> {
    let pass = setup::read_passphrase(false)?;
    blocking(move || Journal::open(path, &pass)).await
}

/// Open for commands that only make sense on a journal already on disk.
async fn open_existing(path: PathBuf) -> Result<Journal> {
    let pass = setup::read_passphrase(false)?;
    blocking(move || Journal::open_existing(path, &pass)).await
}

pub async fn new_journal(path: PathBuf, force: bool) -> Result<()> {
    let pass = setup::read_passphrase(true)?;
    let journal = blocking(move || Journal::create(path, &pass, force)).await?;
    println!("Created {}", journal.path().display());
    Ok(())
}

pub async fn write(path: PathBuf, date: Option<DateKey>, text: Option<String>) -> Result<()> {
    let date = date.unwrap_or_else(DateKey::today);
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read entry from stdin")?;
            buf
        }
    };

    let mut journal = open(path).await?;
    let result = tokio::task::spawn_blocking(move || journal.set_entry(date, text)).await?;
    match result {
        Ok(()) => println!("Saved {date}"),
        Err(StoreError::EmptyJournal) => eprintln!("Empty journal not saved."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn read(path: PathBuf, date: Option<DateKey>) -> Result<()> {
    let date = date.unwrap_or_else(DateKey::today);
    let journal = open_existing(path).await?;
    let text = journal.get_entry(date)?;
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
    Ok(())
}

pub async fn remove(path: PathBuf, date: DateKey) -> Result<()> {
    let mut journal = open_existing(path).await?;
    blocking(move || journal.remove_entry(date)).await?;
    println!("Removed {date}");
    Ok(())
}

#[derive(Serialize)]
struct EntryView<'a> {
    date: DateKey,
    text: &'a str,
}

pub async fn list(path: PathBuf, json: bool) -> Result<()> {
    let journal = open_existing(path).await?;
    let entries = journal.list_entries();

    if json {
        let views: Vec<EntryView<'_>> = entries
            .iter()
            .map(|&(date, text)| EntryView { date, text })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for (date, text) in &entries {
        let preview = text.lines().next().unwrap_or_default();
        println!("{date}\t{preview}");
    }
    println!("({} entries)", entries.len());
    Ok(())
}

pub async fn nav(
    path: PathBuf,
    navigator: Navigator,
    direction: Direction,
    from: Option<DateKey>,
) -> Result<()> {
    let from = from.unwrap_or_else(DateKey::today);
    let journal = open_existing(path).await?;
    match journal.navigate(&navigator, direction, from) {
        Some(target) => println!("{target}"),
        None => eprintln!("No {direction} entry from {from}"),
    }
    Ok(())
}

pub async fn calendar(path: PathBuf, month: Option<(i32, u32)>) -> Result<()> {
    let today = DateKey::today();
    let (year, month) = month.unwrap_or((today.year(), today.month()));
    let journal = open_existing(path).await?;
    let days: Vec<String> = journal
        .marked_days(year, month)
        .iter()
        .map(u32::to_string)
        .collect();
    println!("{year:04}-{month:02}: {}", days.join(" "));
    Ok(())
}

pub async fn info(path: PathBuf) -> Result<()> {
    let journal = open_existing(path).await?;
    let keys = journal.list_keys();
    println!("path:       {}", journal.path().display());
    println!("entries:    {}", journal.len());
    if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
        println!("first:      {first}");
        println!("last:       {last}");
    }
    if let Some(saved) = journal.last_saved() {
        println!("last saved: {}", saved.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
    }
    Ok(())
}
