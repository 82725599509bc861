//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

use crate::catalog::BookState;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a library failure.
///
/// ### Document Errors
/// - [`ErrorKind::Network`] - the document could not be read at all.
/// - [`ErrorKind::Parse`] - the document was read but isn't usable XML.
///
/// ### Workflow Errors
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::Validation`]
/// - [`ErrorKind::InvalidTransition`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Lending`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Fetching a document from the documents backend failed.
    #[display("could not fetch document '{_0}'")]
    Network(#[error(not(source))] String),
    /// A document was fetched but could not be parsed.
    #[display("could not parse document '{_0}'")]
    Parse(#[error(not(source))] String),
    /// No book row or entity with the given id.
    #[display("no entity found with id '{_0}'")]
    NotFound(#[error(not(source))] String),
    /// A required input is missing or malformed; names the input.
    #[display("please provide a valid {_0}")]
    Validation(#[error(not(source))] &'static str),
    /// The book is not in the state the operation requires.
    #[display("book '{id}' {}", state.describe())]
    InvalidTransition { id: String, state: BookState },
    /// Reading or writing the lending store failed.
    #[display("lending store failed")]
    Lending,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Lending)
    }
}
