use exn::ResultExt;
use shelfmark_documents::{Document, Element, EntityKind, Index, UNKNOWN};
use shelfmark_lending::{BorrowRecord, Ledger, LendingStore};
use shelfmark_storage::BackendHandle;
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::load::load_document;
use crate::sources::Sources;

/// Where an entity can be viewed: a document and an id within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub document: String,
    pub id: String,
}
impl Link {
    pub fn new(document: impl Into<String>, id: impl Into<String>) -> Self {
        Self { document: document.into(), id: id.into() }
    }
}

/// A display name with an optional link to the named entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub name: String,
    pub link: Option<Link>,
}
impl Cell {
    fn unknown() -> Self {
        Self { name: UNKNOWN.to_string(), link: None }
    }
}

/// Whether a book is on the shelf or out on loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookState {
    Present,
    Borrowed,
}
impl BookState {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::Present => "is not currently borrowed",
            Self::Borrowed => "is already borrowed",
        }
    }
}
impl Display for BookState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Present => "Present",
            Self::Borrowed => "Borrowed",
        })
    }
}

/// One entry of the `available` or `borrowed` choice lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    /// `"<id> - <title>"`
    pub label: String,
}

/// One book in the catalog table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub title: Cell,
    pub author: Cell,
    pub publisher: Cell,
    pub genre: Cell,
    pub loan: Option<BorrowRecord>,
}
impl Row {
    pub fn state(&self) -> BookState {
        match self.loan {
            Some(_) => BookState::Borrowed,
            None => BookState::Present,
        }
    }

    pub fn choice(&self) -> Choice {
        Choice { id: self.id.clone(), label: format!("{} - {}", self.id, self.title.name) }
    }
}

/// Name indexes for the three documents books refer to.
#[derive(Debug, Clone, Default)]
pub struct Indexes {
    pub authors: Index,
    pub publishers: Index,
    pub genres: Index,
}
impl Indexes {
    pub fn build(authors: &Document, publishers: &Document, genres: &Document) -> Self {
        Self {
            authors: Index::for_kind(authors, EntityKind::Author),
            publishers: Index::for_kind(publishers, EntityKind::Publisher),
            genres: Index::for_kind(genres, EntityKind::Genre),
        }
    }

    fn get(&self, kind: EntityKind) -> Option<&Index> {
        match kind {
            EntityKind::Author => Some(&self.authors),
            EntityKind::Publisher => Some(&self.publishers),
            EntityKind::Genre => Some(&self.genres),
            EntityKind::Book => None,
        }
    }
}

/// The joined catalog: every book with resolved names and loan status,
/// plus the lists of books that can be borrowed or returned.
///
/// Rows and both choice lists keep document order; nothing is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub(crate) rows: Vec<Row>,
    pub(crate) available: Vec<Choice>,
    pub(crate) borrowed: Vec<Choice>,
}
impl Catalog {
    /// Joins an already parsed books document with the reference indexes
    /// and a snapshot of the lending ledger.
    ///
    /// Books without an `id` can't be borrowed or linked to and are left
    /// out.
    pub fn build(books: &Document, indexes: &Indexes, ledger: &Ledger, sources: &Sources) -> Self {
        let mut catalog = Self::default();
        let mut seen = HashSet::new();
        for book in books.elements_by_tag(EntityKind::Book.tag()) {
            let Some(id) = book.id() else {
                tracing::debug!("Skipping book without an id");
                continue;
            };
            if !seen.insert(id) {
                tracing::warn!(id, "Duplicate book id; both rows share one lending record");
            }
            let title = book
                .find(EntityKind::Book.name_field())
                .map(|el| el.text().trim().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string());
            let row = Row {
                id: id.to_string(),
                title: Cell { name: title, link: Some(Link::new(sources.document(EntityKind::Book), id)) },
                author: reference_cell(book, EntityKind::Author, indexes, sources),
                publisher: reference_cell(book, EntityKind::Publisher, indexes, sources),
                genre: reference_cell(book, EntityKind::Genre, indexes, sources),
                loan: ledger.get(id).cloned(),
            };
            match row.state() {
                BookState::Present => catalog.available.push(row.choice()),
                BookState::Borrowed => catalog.borrowed.push(row.choice()),
            }
            catalog.rows.push(row);
        }
        catalog
    }

    /// Loads all four documents concurrently, indexes them and joins them
    /// with the current contents of `store`.
    ///
    /// Any document failing to load or parse fails the whole catalog.
    #[instrument(level = "debug", skip_all, fields(backend = backend.name()))]
    pub async fn load(backend: &BackendHandle, sources: &Sources, store: &dyn LendingStore) -> Result<Self> {
        let (books, authors, publishers, genres) = futures::try_join!(
            load_document(backend, sources.document(EntityKind::Book)),
            load_document(backend, sources.document(EntityKind::Author)),
            load_document(backend, sources.document(EntityKind::Publisher)),
            load_document(backend, sources.document(EntityKind::Genre)),
        )?;
        let indexes = Indexes::build(&authors, &publishers, &genres);
        let ledger = store.get_all().await.or_raise(|| ErrorKind::Lending)?;
        let catalog = Self::build(&books, &indexes, &ledger, sources);
        tracing::info!(
            books = catalog.rows.len(),
            available = catalog.available.len(),
            borrowed = catalog.borrowed.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// Books that can be borrowed.
    pub fn available(&self) -> &[Choice] {
        &self.available
    }

    /// Books that can be returned.
    pub fn borrowed(&self) -> &[Choice] {
        &self.borrowed
    }
}

fn reference_cell(book: &Element, kind: EntityKind, indexes: &Indexes, sources: &Sources) -> Cell {
    let Some(reference) = book.find(kind.tag()).and_then(Element::reference) else {
        return Cell::unknown();
    };
    let Some(index) = indexes.get(kind) else {
        return Cell::unknown();
    };
    Cell {
        name: index.name_or_unknown(&reference.id).to_string(),
        link: Some(Link::new(sources.document(kind), reference.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfmark_documents::parse;
    use shelfmark_lending::{LoanPeriod, parse_date};

    const BOOKS: &str = r#"<Books xmlns:xlink="http://www.w3.org/1999/xlink">
        <Book id="b1">
            <Title>The Dispossessed</Title>
            <Author xlink:href="authors.xml#a1">Ursula K. Le Guin</Author>
            <Publisher xlink:href="publishers.xml#p1">Harper</Publisher>
            <Genre xlink:href="genres.xml#g1">Science Fiction</Genre>
        </Book>
        <Book id="b2">
            <Title>Mystery Book</Title>
            <Author xlink:href="authors.xml#a404">Nobody</Author>
        </Book>
        <Book><Title>No id</Title></Book>
        <Book id="b3">
            <Title>Kindred</Title>
            <Author>Octavia E. Butler</Author>
        </Book>
    </Books>"#;

    fn indexes() -> Indexes {
        Indexes::build(
            &parse(r#"<Authors><Author id="a1"><Name>Ursula K. Le Guin</Name></Author></Authors>"#).unwrap(),
            &parse(r#"<Publishers><Publisher id="p1"><Name>Harper &amp; Row</Name></Publisher></Publishers>"#).unwrap(),
            &parse(r#"<Genres><Genre id="g1"><Name>Science Fiction</Name></Genre></Genres>"#).unwrap(),
        )
    }

    #[test]
    fn test_join() {
        let catalog = Catalog::build(&parse(BOOKS).unwrap(), &indexes(), &Ledger::new(), &Sources::default());
        let ids: Vec<_> = catalog.rows().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b1", "b2", "b3"]);

        let first = &catalog.rows()[0];
        assert_eq!(first.title.name, "The Dispossessed");
        assert_eq!(first.title.link, Some(Link::new("books.xml", "b1")));
        assert_eq!(first.author.name, "Ursula K. Le Guin");
        assert_eq!(first.author.link, Some(Link::new("authors.xml", "a1")));
        assert_eq!(first.publisher.name, "Harper & Row");
        assert_eq!(first.genre.name, "Science Fiction");
        assert_eq!(first.state(), BookState::Present);
    }

    #[test]
    fn test_unknown_references() {
        let catalog = Catalog::build(&parse(BOOKS).unwrap(), &indexes(), &Ledger::new(), &Sources::default());

        let dangling = catalog.row("b2").unwrap();
        assert_eq!(dangling.author.name, UNKNOWN);
        assert_eq!(dangling.author.link, Some(Link::new("authors.xml", "a404")));
        assert_eq!(dangling.publisher, Cell::unknown());
        assert_eq!(dangling.genre, Cell::unknown());

        // Author present but not a reference.
        assert_eq!(catalog.row("b3").unwrap().author, Cell::unknown());
    }

    #[test]
    fn test_borrowing_overlay() {
        let mut ledger = Ledger::new();
        let record = BorrowRecord::new("Sam", parse_date("2024-01-31").unwrap(), LoanPeriod::default()).unwrap();
        ledger.insert("b2".to_string(), record.clone());
        // Records for books that aren't in the catalog are ignored.
        ledger.insert("b99".to_string(), record.clone());

        let catalog = Catalog::build(&parse(BOOKS).unwrap(), &indexes(), &ledger, &Sources::default());
        assert_eq!(catalog.row("b2").unwrap().state(), BookState::Borrowed);
        assert_eq!(catalog.row("b2").unwrap().loan, Some(record));
        assert_eq!(catalog.row("b1").unwrap().state(), BookState::Present);

        let available: Vec<_> = catalog.available().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(available, ["b1 - The Dispossessed", "b3 - Kindred"]);
        let borrowed: Vec<_> = catalog.borrowed().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(borrowed, ["b2 - Mystery Book"]);
    }

    #[test]
    fn test_links_follow_configured_names() {
        let sources = Sources { authors: "people.xml".to_string(), ..Sources::default() };
        let catalog = Catalog::build(&parse(BOOKS).unwrap(), &indexes(), &Ledger::new(), &sources);
        assert_eq!(catalog.row("b1").unwrap().author.link, Some(Link::new("people.xml", "a1")));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(BookState::Present.to_string(), "Present");
        assert_eq!(BookState::Borrowed.to_string(), "Borrowed");
    }
}
