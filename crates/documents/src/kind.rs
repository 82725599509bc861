use std::fmt::{Display, Formatter, Result as FmtResult};

/// The closed set of entity kinds a catalog is made of.
///
/// Each kind owns exactly one document and knows how its entities are
/// tagged and named; see [`EntityKind::document`], [`EntityKind::tag`] and
/// [`EntityKind::name_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Book,
    Author,
    Publisher,
    Genre,
}

struct KindSpec {
    document: &'static str,
    tag: &'static str,
    name_field: &'static str,
    label: &'static str,
}

const BOOK: KindSpec = KindSpec { document: "books.xml", tag: "Book", name_field: "Title", label: "Book" };
const AUTHOR: KindSpec = KindSpec { document: "authors.xml", tag: "Author", name_field: "Name", label: "Author" };
const PUBLISHER: KindSpec =
    KindSpec { document: "publishers.xml", tag: "Publisher", name_field: "Name", label: "Publisher" };
const GENRE: KindSpec = KindSpec { document: "genres.xml", tag: "Genre", name_field: "Name", label: "Genre" };

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Book, Self::Author, Self::Publisher, Self::Genre];

    fn spec(self) -> &'static KindSpec {
        match self {
            Self::Book => &BOOK,
            Self::Author => &AUTHOR,
            Self::Publisher => &PUBLISHER,
            Self::Genre => &GENRE,
        }
    }

    /// Default document file name, e.g. `authors.xml`.
    pub fn document(self) -> &'static str {
        self.spec().document
    }

    /// Element tag of a single entity, e.g. `Author`.
    pub fn tag(self) -> &'static str {
        self.spec().tag
    }

    /// Child element holding the display name (`Title` for books, `Name`
    /// for everything else).
    pub fn name_field(self) -> &'static str {
        self.spec().name_field
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    /// Looks a kind up by the file name of a referenced document.
    ///
    /// Only the final path component is compared, so `data/authors.xml`
    /// and `authors.xml` both resolve to [`EntityKind::Author`].
    ///
    /// ```
    /// use shelfmark_documents::EntityKind;
    /// assert_eq!(EntityKind::from_document("data/genres.xml"), Some(EntityKind::Genre));
    /// assert_eq!(EntityKind::from_document("reviews.xml"), None);
    /// ```
    pub fn from_document(document: &str) -> Option<Self> {
        let file_name = document.rsplit(['/', '\\']).next().unwrap_or(document);
        Self::ALL.into_iter().find(|kind| kind.document() == file_name)
    }

    /// Looks a kind up by entity tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label())
    }
}
