pub mod config;
pub mod date_key;
pub mod error;
pub mod lifecycle;
pub mod navigator;

pub use date_key::DateKey;
pub use error::{CoreError, CoreResult};
pub use navigator::{Direction, Navigator, PreviousBeforeFirst};
