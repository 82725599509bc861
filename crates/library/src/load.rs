use exn::ResultExt;
use shelfmark_documents::{Document, parse};
use shelfmark_storage::BackendHandle;
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Reads `document` from the documents backend and parses it.
///
/// A failed read is [`ErrorKind::Network`] and unparseable content is
/// [`ErrorKind::Parse`]; both carry the document name and the underlying
/// error as a child.
#[instrument(level = "debug", skip(backend), fields(backend = backend.name()))]
pub async fn load_document(backend: &BackendHandle, document: &str) -> Result<Document> {
    let bytes = backend.read(Path::new(document)).await.or_raise(|| ErrorKind::Network(document.to_string()))?;
    let parsed = parse(&bytes).or_raise(|| ErrorKind::Parse(document.to_string()))?;
    tracing::debug!(bytes = bytes.len(), "Loaded document");
    Ok(parsed)
}
