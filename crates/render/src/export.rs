use crate::error::{ErrorKind, Result};
use crate::pages::{INDEX_PAGE, Pages, STYLESHEET, page_path};
use crate::style::StyleConfig;
use exn::ResultExt;
use shelfmark_library::{Catalog, EntityView, Link};
use shelfmark_storage::BackendHandle;
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

/// What an export wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Exported {
    /// Pages written, including `index.html`.
    pub pages: usize,
}

/// Writes the catalog, one page per entity and the stylesheet as a static
/// site rooted at `backend`.
///
/// Existing files at the same paths are replaced; nothing else is removed.
/// Two entities whose pages would share a path fail the export with
/// [`ErrorKind::PathCollision`] before that page is written.
#[instrument(skip_all, fields(backend = backend.name(), entities = views.len()))]
pub async fn export(
    backend: &BackendHandle,
    pages: &Pages,
    styles: &StyleConfig,
    catalog: &Catalog,
    views: &[EntityView],
) -> Result<Exported> {
    write(backend, STYLESHEET, &styles.stylesheet()).await?;
    write(backend, INDEX_PAGE, pages.catalog(catalog)?.as_bytes()).await?;
    let mut exported = Exported { pages: 1 };
    let mut written = HashSet::new();
    for view in views {
        let path = page_path(&Link::new(view.document.as_str(), view.id.as_str()));
        if !written.insert(path.clone()) {
            exn::bail!(ErrorKind::PathCollision(path));
        }
        write(backend, &path, pages.entity(view)?.as_bytes()).await?;
        exported.pages += 1;
    }
    tracing::info!(pages = exported.pages, "Exported site");
    Ok(exported)
}

async fn write(backend: &BackendHandle, path: &str, content: &[u8]) -> Result<()> {
    backend.write(Path::new(path), content).await.or_raise(|| ErrorKind::Storage)?;
    tracing::debug!(path, bytes = content.len(), "Wrote page");
    Ok(())
}
