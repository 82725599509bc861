use shelfmark_documents::EntityKind;

/// Document names for each entity kind, relative to the documents backend.
///
/// References inside the documents name their target by file, so the kind
/// of a reference is looked up against these names first and the built-in
/// defaults second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub books: String,
    pub authors: String,
    pub publishers: String,
    pub genres: String,
}
impl Sources {
    pub fn document(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Book => &self.books,
            EntityKind::Author => &self.authors,
            EntityKind::Publisher => &self.publishers,
            EntityKind::Genre => &self.genres,
        }
    }

    /// The kind whose document is `document`.
    ///
    /// ```
    /// use shelfmark_documents::EntityKind;
    /// use shelfmark_library::Sources;
    /// let sources = Sources { authors: "people.xml".into(), ..Sources::default() };
    /// assert_eq!(sources.kind_of("people.xml"), Some(EntityKind::Author));
    /// assert_eq!(sources.kind_of("data/authors.xml"), Some(EntityKind::Author));
    /// assert_eq!(sources.kind_of("reviews.xml"), None);
    /// ```
    pub fn kind_of(&self, document: &str) -> Option<EntityKind> {
        let file_name = document.rsplit(['/', '\\']).next().unwrap_or(document);
        EntityKind::ALL
            .into_iter()
            .find(|kind| {
                let configured = self.document(*kind);
                configured == document || configured.rsplit(['/', '\\']).next() == Some(file_name)
            })
            .or_else(|| EntityKind::from_document(document))
    }
}
impl Default for Sources {
    fn default() -> Self {
        Self {
            books: EntityKind::Book.document().to_string(),
            authors: EntityKind::Author.document().to_string(),
            publishers: EntityKind::Publisher.document().to_string(),
            genres: EntityKind::Genre.document().to_string(),
        }
    }
}
