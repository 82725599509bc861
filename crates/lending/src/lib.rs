//! Lending state: who has which book, and until when.
//!
//! Records are kept per book id in a [`LendingStore`]. The production store
//! is [`BackendStore`], which keeps the whole ledger as one JSON object on a
//! storage backend; [`MemoryStore`] is handy for tests and dry runs.

pub mod error;
mod memory;
mod record;
mod store;

pub use crate::memory::MemoryStore;
pub use crate::record::{BorrowRecord, LoanPeriod, format_date, parse_date};
pub use crate::store::{BackendStore, DEFAULT_KEY, Ledger, LendingStore};
pub use time::Date;
