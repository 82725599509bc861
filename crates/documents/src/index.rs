use std::collections::HashMap;
use tracing::instrument;

use crate::kind::EntityKind;
use crate::tree::Document;

/// Display name used whenever an entity, name or reference can't be found.
pub const UNKNOWN: &str = "Unknown";

/// Mapping from entity id to display name for one document.
///
/// Ids are only unique within their own document, so an index is always
/// built per document. When a document repeats an id the later entity wins;
/// every overwritten id is logged and kept in [`Index::duplicates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    names: HashMap<String, String>,
    duplicates: Vec<String>,
}
impl Index {
    /// Indexes every `tag` element by its `id` attribute, naming each by the
    /// text of its first `name_field` descendant.
    ///
    /// Elements without an `id` are skipped; an entity without a
    /// `name_field` child is named [`UNKNOWN`].
    ///
    /// ```
    /// use shelfmark_documents::{Index, parse};
    /// let document = parse(r#"<Publishers>
    ///     <Publisher id="p1"><Name>Gollancz</Name></Publisher>
    ///     <Publisher id="p2"/>
    /// </Publishers>"#).unwrap();
    /// let index = Index::build(&document, "Publisher", "Name");
    /// assert_eq!(index.name_or_unknown("p1"), "Gollancz");
    /// assert_eq!(index.name_or_unknown("p2"), "Unknown");
    /// assert_eq!(index.name_or_unknown("p9"), "Unknown");
    /// ```
    #[instrument(level = "debug", skip(document))]
    pub fn build(document: &Document, tag: &str, name_field: &str) -> Self {
        let mut index = Self::default();
        for entity in document.elements_by_tag(tag) {
            let Some(id) = entity.id() else {
                tracing::trace!(tag, "Skipping entity without an id");
                continue;
            };
            let name = entity.find(name_field).map(|el| el.text().trim().to_string()).unwrap_or_else(|| UNKNOWN.to_string());
            if let Some(previous) = index.names.insert(id.to_string(), name) {
                tracing::warn!(tag, id, previous = %previous, "Duplicate entity id; the later entity replaces the earlier one");
                index.duplicates.push(id.to_string());
            }
        }
        tracing::debug!(entities = index.names.len(), duplicates = index.duplicates.len(), "Indexed document");
        index
    }

    /// Indexes using the tag and display field from the kind dispatch table.
    pub fn for_kind(document: &Document, kind: EntityKind) -> Self {
        Self::build(document, kind.tag(), kind.name_field())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn name_or_unknown(&self, id: &str) -> &str {
        self.get(id).unwrap_or(UNKNOWN)
    }

    /// Ids that appeared more than once, once per extra occurrence.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_builds_names() {
        let document = parse(
            r#"<Authors>
                <Author id="a1"><Name> Iain M. Banks </Name></Author>
                <Author id="a2"><Name>Octavia E. Butler</Name></Author>
            </Authors>"#,
        )
        .unwrap();
        let index = Index::build(&document, "Author", "Name");
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a1"), Some("Iain M. Banks"));
        assert_eq!(index.get("a2"), Some("Octavia E. Butler"));
        assert!(index.duplicates().is_empty());
    }

    #[test]
    fn test_missing_name_is_unknown() {
        let document = parse(r#"<Genres><Genre id="g1"><Description>No name</Description></Genre></Genres>"#).unwrap();
        let index = Index::build(&document, "Genre", "Name");
        assert_eq!(index.get("g1"), Some(UNKNOWN));
    }

    #[test]
    fn test_skips_entities_without_id() {
        let document = parse(r#"<Genres><Genre><Name>Orphan</Name></Genre></Genres>"#).unwrap();
        assert!(Index::build(&document, "Genre", "Name").is_empty());
    }

    #[test]
    fn test_duplicate_ids_last_wins_and_are_reported() {
        let document = parse(
            r#"<Publishers>
                <Publisher id="p1"><Name>First</Name></Publisher>
                <Publisher id="p1"><Name>Second</Name></Publisher>
            </Publishers>"#,
        )
        .unwrap();
        let index = Index::build(&document, "Publisher", "Name");
        assert_eq!(index.len(), 1);
        assert_eq!(index.name_or_unknown("p1"), "Second");
        assert_eq!(index.duplicates(), ["p1".to_string()]);
    }

    #[test]
    fn test_books_indexed_by_title() {
        let document = parse(r#"<Books><Book id="b1"><Title>Kindred</Title></Book></Books>"#).unwrap();
        let index = Index::for_kind(&document, EntityKind::Book);
        assert_eq!(index.get("b1"), Some("Kindred"));
        // Books have no Name child.
        assert_eq!(Index::build(&document, "Book", "Name").get("b1"), Some(UNKNOWN));
    }

    #[test]
    fn test_only_matching_tag_indexed() {
        let document = parse(r#"<Catalog><Author id="x"><Name>A</Name></Author><Genre id="x"><Name>G</Name></Genre></Catalog>"#)
            .unwrap();
        assert_eq!(Index::build(&document, "Genre", "Name").get("x"), Some("G"));
        assert_eq!(Index::build(&document, "Author", "Name").get("x"), Some("A"));
    }
}
