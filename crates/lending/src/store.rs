use async_trait::async_trait;
use exn::ResultExt;
use shelfmark_storage::BackendHandle;
use shelfmark_storage::error::ErrorKind as StorageErrorKind;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::record::BorrowRecord;

/// Every borrowed book, keyed by book id.
pub type Ledger = BTreeMap<String, BorrowRecord>;

/// Storage key used when none is configured.
pub const DEFAULT_KEY: &str = "borrowingData";

/// Persistent mapping from book id to its current loan.
///
/// A book without a record is available. The store knows nothing about the
/// catalog: it will happily hold records for ids that no longer exist.
#[async_trait]
pub trait LendingStore: Send + Sync {
    /// The whole ledger. A store that has never been written is empty.
    async fn get_all(&self) -> Result<Ledger>;

    async fn get(&self, book_id: &str) -> Result<Option<BorrowRecord>> {
        Ok(self.get_all().await?.remove(book_id))
    }

    /// Inserts or replaces the record for `book_id`.
    async fn set(&self, book_id: &str, record: BorrowRecord) -> Result<()>;

    /// Removes the record for `book_id`, returning whether one existed.
    async fn delete(&self, book_id: &str) -> Result<bool>;

    /// Removes every record.
    async fn clear(&self) -> Result<()>;
}

/// Lending store persisted as a single JSON object on a storage backend.
///
/// The whole ledger lives in `<key>.json` and every mutation rewrites it.
/// A missing file, or one holding `null`, reads as an empty ledger.
pub struct BackendStore {
    backend: BackendHandle,
    path: PathBuf,
}
impl BackendStore {
    pub fn new(backend: BackendHandle, key: &str) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() || key.contains(['/', '\\', '\0']) || key.starts_with('.') {
            exn::bail!(ErrorKind::InvalidKey(key.to_string()));
        }
        Ok(Self { backend, path: PathBuf::from(format!("{key}.json")) })
    }

    pub fn with_default_key(backend: BackendHandle) -> Result<Self> {
        Self::new(backend, DEFAULT_KEY)
    }

    /// Path of the state file, relative to the backend root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Ledger> {
        let bytes = match self.backend.read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => return Ok(Ledger::new()),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        };
        let ledger: Option<Ledger> =
            serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Corrupt(self.path.clone()))?;
        Ok(ledger.unwrap_or_default())
    }

    async fn save(&self, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_vec(ledger).or_raise(|| ErrorKind::Serialize)?;
        self.backend.write(&self.path, &json).await.or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(backend = self.backend.name(), path = %self.path.display(), records = ledger.len(), "Saved lending state");
        Ok(())
    }
}

#[async_trait]
impl LendingStore for BackendStore {
    async fn get_all(&self) -> Result<Ledger> {
        self.load().await
    }

    #[instrument(level = "debug", skip(self, record))]
    async fn set(&self, book_id: &str, record: BorrowRecord) -> Result<()> {
        let mut ledger = self.load().await?;
        ledger.insert(book_id.to_string(), record);
        self.save(&ledger).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, book_id: &str) -> Result<bool> {
        let mut ledger = self.load().await?;
        if ledger.remove(book_id).is_none() {
            return Ok(false);
        }
        self.save(&ledger).await?;
        Ok(true)
    }

    #[instrument(level = "debug", skip(self))]
    async fn clear(&self) -> Result<()> {
        match self.backend.delete(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => Ok(()),
            Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
        }
    }
}
