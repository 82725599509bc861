//! Command-line error types.
//!
//! Each variant names the step that failed; the error from the crate that
//! did the work is kept underneath it in the `exn` tree.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// Opening one of the storage roots failed; names the root.
    #[display("could not open {_0} storage")]
    Storage(#[error(not(source))] &'static str),
    #[display("could not open lending state")]
    Lending,
    #[display("catalog operation failed")]
    Library,
    #[display("could not export the catalog")]
    Render,
    #[display("could not write output")]
    Output,
}
