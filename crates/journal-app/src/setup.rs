use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use journal_core::config::AppConfig;
use zeroize::Zeroizing;

/// Environment variable checked before prompting for a passphrase.
pub const PASSPHRASE_ENV: &str = "JOURNAL_PASSPHRASE";

/// The journal file: `--journal` wins over the configured path.
pub fn journal_path(explicit: Option<&Path>, config: &AppConfig) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.journal.path_buf())
}

/// Read the passphrase from the environment or the terminal.
///
/// Whitespace is significant and never trimmed. `confirm` asks twice when
/// prompting, for new journals.
pub fn read_passphrase(confirm: bool) -> Result<Zeroizing<String>> {
    let pass = match std::env::var(PASSPHRASE_ENV) {
        Ok(pass) => {
            tracing::debug!("Using passphrase from {PASSPHRASE_ENV}");
            Zeroizing::new(pass)
        }
        Err(_) => {
            let pass = Zeroizing::new(rpassword::prompt_password("Journal passphrase: ")?);
            if confirm {
                let again = Zeroizing::new(rpassword::prompt_password("Confirm passphrase: ")?);
                if *pass != *again {
                    bail!("Passphrases don't match");
                }
            }
            pass
        }
    };

    if pass.is_empty() {
        bail!("Passphrase cannot be empty");
    }
    Ok(pass)
}
