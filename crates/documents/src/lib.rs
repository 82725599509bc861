//! Catalog documents: parsing, entity kinds, references and indexes.
//!
//! A catalog is four flat XML documents (books, authors, publishers,
//! genres). Each entity carries an `id` attribute that is unique only within
//! its own document, and may point at entities in the other documents with
//! an `href` attribute of the form `<document>#<id>`:
//!
//! ```xml
//! <Book id="b1">
//!     <Title>The Dispossessed</Title>
//!     <Author xlink:href="authors.xml#a1">Ursula K. Le Guin</Author>
//! </Book>
//! ```
//!
//! This crate never touches storage; callers fetch the bytes and hand them
//! to [`parse`].

pub mod error;
mod index;
mod kind;
mod parse;
mod reference;
mod tree;

pub use crate::index::{Index, UNKNOWN};
pub use crate::kind::EntityKind;
pub use crate::parse::parse;
pub use crate::reference::Reference;
pub use crate::tree::{Descendants, Document, Element, Node};

/// One child field of an entity, as shown on a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Element name of the field, e.g. `Title` or `Author`.
    pub name: String,
    /// Text content, trimmed.
    pub text: String,
    pub reference: Option<Reference>,
}

/// Splits an entity into its direct child fields, in document order.
///
/// ```
/// let document = shelfmark_documents::parse(r#"<Book id="b1">
///     <Title>Kindred</Title>
///     <Author xlink:href="authors.xml#a4">Octavia E. Butler</Author>
/// </Book>"#).unwrap();
/// let fields = shelfmark_documents::fields(document.root());
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields[0].text, "Kindred");
/// assert_eq!(fields[1].reference.as_ref().unwrap().id, "a4");
/// ```
pub fn fields(entity: &Element) -> Vec<Field> {
    entity
        .children()
        .map(|child| Field {
            name: child.name().to_string(),
            text: child.text().trim().to_string(),
            reference: child.reference(),
        })
        .collect()
}
