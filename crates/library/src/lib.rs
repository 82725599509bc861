//! The catalog and lending workflow on top of the document and lending
//! crates.
//!
//! - [`Catalog::load`] joins the four catalog documents with the lending
//!   ledger into table rows and the two choice lists.
//! - [`view_entity`] builds the detail view of any entity, resolving its
//!   references into names and links.
//! - [`Catalog::borrow`], [`Catalog::return_book`] and [`clear_all`] change
//!   lending state after asking a [`Confirm`].

mod catalog;
pub mod error;
mod load;
mod sources;
mod view;
mod workflow;

pub use crate::catalog::{BookState, Catalog, Cell, Choice, Indexes, Link, Row};
pub use crate::load::load_document;
pub use crate::sources::Sources;
pub use crate::view::{Borrowing, EntityView, FieldView, ResolvedReference, resolve_references, view_all, view_entity};
pub use crate::workflow::{BorrowRequest, Confirm, Outcome, ReturnRequest, clear_all};
