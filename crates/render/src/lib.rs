//! HTML rendering and static export of a shelfmark catalog.
//!
//! [`Pages`] turns the view-models from `shelfmark-library` into HTML, and
//! [`export`] writes a browsable site: `index.html`, one page per entity
//! and a stylesheet assembled by [`StyleConfig`].

pub mod error;
mod export;
mod pages;
mod style;

pub use crate::export::{Exported, export};
pub use crate::pages::{INDEX_PAGE, Pages, STYLESHEET, escape_html, page_href, page_path};
pub use crate::style::StyleConfig;
