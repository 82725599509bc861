//! Render Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Asset was not loadable (either file or builtin).
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// A page template failed to compile or render.
    #[display("could not render template '{_0}'")]
    Template(#[error(not(source))] String),
    /// Writing the exported site failed.
    #[display("could not write exported page")]
    Storage,
    /// Two entities map to the same page path.
    #[display("more than one entity exports to '{_0}'")]
    PathCollision(#[error(not(source))] String),
    /// A stylesheet file could not be read.
    #[display("could not read stylesheet file")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}
