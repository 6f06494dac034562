use thiserror::Error;

use journal_crypto::CryptoError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An entry failed to decrypt; almost always a wrong passphrase.
    #[error("Authentication failed, check your passphrase: {0}")]
    Authentication(#[from] CryptoError),

    #[error("Malformed journal file at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty journal not saved")]
    EmptyJournal,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
