//! Lending Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A lending error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for lending operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The storage backend holding the lending state failed.
    #[display("lending state storage failed")]
    Storage,
    /// The persisted state exists but isn't a valid borrowing object.
    #[display("lending state is corrupt: {}", _0.display())]
    Corrupt(#[error(not(source))] PathBuf),
    /// The state could not be serialized.
    #[display("could not serialize lending state")]
    Serialize,
    /// A date string is not `YYYY-MM-DD`.
    #[display("invalid date '{_0}', expected YYYY-MM-DD")]
    InvalidDate(#[error(not(source))] String),
    /// Date arithmetic left the supported calendar range.
    #[display("date out of range")]
    DateOutOfRange,
    /// The storage key can't be used as a file name.
    #[display("invalid lending store key: '{_0}'")]
    InvalidKey(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
