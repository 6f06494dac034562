pub mod error;
pub mod fernet;
pub mod key;

pub use error::{CryptoError, CryptoResult};
pub use key::JournalKey;
