//! Storage backends for shelfmark.
//!
//! Two things live in storage: the read-only XML documents that make up the
//! catalog, and the JSON state written by the lending store. Both go through
//! the same [`StorageBackend`] trait so that tests can swap in an in-memory
//! backend and `--dry-run` can wrap the state backend in a
//! [`ReadOnlyBackend`](backend::ReadOnlyBackend).

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
