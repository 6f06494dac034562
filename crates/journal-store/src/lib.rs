pub mod atomic;
pub mod codec;
pub mod error;
pub mod journal;

pub use error::{StoreError, StoreResult};
pub use journal::Journal;
