use std::fmt::{Display, Formatter, Result as FmtResult};

/// A pointer from one document to an entity in another, written
/// `<document>#<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub document: String,
    pub id: String,
}
impl Reference {
    pub fn new(document: impl Into<String>, id: impl Into<String>) -> Self {
        Self { document: document.into(), id: id.into() }
    }

    /// Splits a `document#id` value at the first `#`.
    ///
    /// Values without a `#` are not references. Either side may be empty;
    /// an empty id simply never resolves.
    ///
    /// ```
    /// use shelfmark_documents::Reference;
    /// let reference = Reference::parse("publishers.xml#p2").unwrap();
    /// assert_eq!(reference.document, "publishers.xml");
    /// assert_eq!(reference.id, "p2");
    /// assert!(Reference::parse("publishers.xml").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let (document, id) = value.trim().split_once('#')?;
        Some(Self::new(document, id))
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}#{}", self.document, self.id)
    }
}
