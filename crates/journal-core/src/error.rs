use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid date key {0:?}: expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("Unknown navigation direction: {0}")]
    UnknownDirection(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
