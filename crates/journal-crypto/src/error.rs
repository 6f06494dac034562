use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// The token failed verification: wrong passphrase, corruption or tampering.
    #[error("Invalid token: wrong passphrase or corrupted data")]
    InvalidToken,

    #[error("Decrypted entry is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Base64 decode error: {0}")]
    Base64(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
