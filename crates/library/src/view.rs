use exn::{OptionExt, ResultExt};
use futures::future::join_all;
use shelfmark_documents::{Element, EntityKind, Field, Index, UNKNOWN, fields};
use shelfmark_lending::{BorrowRecord, LendingStore};
use shelfmark_storage::BackendHandle;
use std::collections::{BTreeSet, HashMap};
use std::ops::Deref;
use tracing::instrument;

use crate::catalog::Link;
use crate::error::{ErrorKind, Result};
use crate::load::load_document;
use crate::sources::Sources;

/// A reference field resolved against its target document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub kind: EntityKind,
    pub link: Link,
    /// Display name of the target, or [`UNKNOWN`] if it couldn't be found.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: String,
    pub text: String,
    /// Present only for references to a known entity kind.
    pub resolved: Option<ResolvedReference>,
}

/// Loan status shown on a book's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Borrowing {
    Borrowed(BorrowRecord),
    Available,
}

/// Everything needed to show one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityView {
    /// Document the entity was found in.
    pub document: String,
    /// Element name of the entity, as written in the document.
    pub tag: String,
    pub id: String,
    pub kind: Option<EntityKind>,
    pub fields: Vec<FieldView>,
    /// Only set for books.
    pub borrowing: Option<Borrowing>,
}
impl EntityView {
    pub fn heading(&self) -> String {
        format!("{} Details", self.tag)
    }
}

/// Builds the detail view of the entity `id` in `document`.
///
/// Only the viewed document itself can fail the view. References are
/// resolved with [`resolve_references`], so a broken target degrades to
/// [`UNKNOWN`] instead.
#[instrument(level = "debug", skip(backend, sources, store))]
pub async fn view_entity(
    backend: &BackendHandle,
    sources: &Sources,
    store: &dyn LendingStore,
    document: &str,
    id: &str,
) -> Result<EntityView> {
    let parsed = load_document(backend, document).await?;
    let entity = parsed.find_by_id(id).ok_or_raise(|| ErrorKind::NotFound(format!("{document}#{id}")))?;
    let fields = fields(entity);
    let resolved = resolve_references(backend, sources, &fields).await;
    let borrowing = match EntityKind::from_tag(entity.local_name()) {
        Some(EntityKind::Book) => Some(store.get(id).await.or_raise(|| ErrorKind::Lending)?),
        _ => None,
    };
    Ok(assemble(document, entity, fields, resolved, borrowing))
}

/// Builds the detail view of every entity in the catalog, in kind order
/// (books, authors, publishers, genres) and document order within a kind.
///
/// Each document and the ledger are read once. Unlike [`view_entity`], any
/// document failing to load fails the whole call.
#[instrument(level = "debug", skip_all, fields(backend = backend.name()))]
pub async fn view_all(backend: &BackendHandle, sources: &Sources, store: &dyn LendingStore) -> Result<Vec<EntityView>> {
    let (books, authors, publishers, genres) = futures::try_join!(
        load_document(backend, sources.document(EntityKind::Book)),
        load_document(backend, sources.document(EntityKind::Author)),
        load_document(backend, sources.document(EntityKind::Publisher)),
        load_document(backend, sources.document(EntityKind::Genre)),
    )?;
    let ledger = store.get_all().await.or_raise(|| ErrorKind::Lending)?;
    let documents = [
        (EntityKind::Book, books),
        (EntityKind::Author, authors),
        (EntityKind::Publisher, publishers),
        (EntityKind::Genre, genres),
    ];
    let indexes: HashMap<EntityKind, Index> =
        documents.iter().map(|(kind, document)| (*kind, Index::for_kind(document, *kind))).collect();

    let mut views = Vec::new();
    for (kind, document) in &documents {
        for entity in document.elements_by_tag(kind.tag()) {
            let Some(id) = entity.id() else {
                continue;
            };
            let fields = fields(entity);
            let resolved = resolve_with(&indexes, sources, &fields);
            let borrowing = (*kind == EntityKind::Book).then(|| ledger.get(id).cloned());
            views.push(assemble(sources.document(*kind), entity, fields, resolved, borrowing));
        }
    }
    tracing::debug!(entities = views.len(), "Built entity views");
    Ok(views)
}

fn assemble(
    document: &str,
    entity: &Element,
    fields: Vec<Field>,
    resolved: Vec<Option<ResolvedReference>>,
    borrowing: Option<Option<BorrowRecord>>,
) -> EntityView {
    EntityView {
        document: document.to_string(),
        tag: entity.name().to_string(),
        id: entity.id().unwrap_or_default().to_string(),
        kind: EntityKind::from_tag(entity.local_name()),
        fields: fields
            .into_iter()
            .zip(resolved)
            .map(|(field, resolved)| FieldView { name: field.name, text: field.text, resolved })
            .collect(),
        borrowing: borrowing.map(|record| match record {
            Some(record) => Borrowing::Borrowed(record),
            None => Borrowing::Available,
        }),
    }
}

/// Resolves every reference field to a display name and link.
///
/// Returns one entry per field, in order. Plain fields and references to
/// documents of no known kind give `None`. Each cited document is loaded
/// once, all of them concurrently; a document that fails to load or parse
/// resolves all of its references to [`UNKNOWN`].
pub async fn resolve_references(
    backend: &BackendHandle,
    sources: &Sources,
    fields: &[Field],
) -> Vec<Option<ResolvedReference>> {
    let cited: BTreeSet<EntityKind> = fields
        .iter()
        .filter_map(|field| field.reference.as_ref())
        .filter_map(|reference| sources.kind_of(&reference.document))
        .collect();

    let indexes: HashMap<EntityKind, Index> = join_all(cited.into_iter().map(|kind| async move {
        let document = sources.document(kind);
        match load_document(backend, document).await {
            Ok(parsed) => Some((kind, Index::for_kind(&parsed, kind))),
            Err(e) => {
                tracing::warn!(document, error = %e.deref(), "Could not load referenced document");
                None
            },
        }
    }))
    .await
    .into_iter()
    .flatten()
    .collect();
    resolve_with(&indexes, sources, fields)
}

fn resolve_with(
    indexes: &HashMap<EntityKind, Index>,
    sources: &Sources,
    fields: &[Field],
) -> Vec<Option<ResolvedReference>> {
    fields
        .iter()
        .map(|field| {
            let reference = field.reference.as_ref()?;
            let Some(kind) = sources.kind_of(&reference.document) else {
                tracing::debug!(%reference, "Reference to a document of unknown kind");
                return None;
            };
            let name = match indexes.get(&kind).and_then(|index| index.get(&reference.id)) {
                Some(name) => name.to_string(),
                None => {
                    tracing::warn!(%reference, "Reference target not found");
                    UNKNOWN.to_string()
                },
            };
            Some(ResolvedReference { kind, link: Link::new(sources.document(kind), reference.id.clone()), name })
        })
        .collect()
}
