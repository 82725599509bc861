use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::record::BorrowRecord;
use crate::store::{Ledger, LendingStore};

/// Lending store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
}
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LendingStore for MemoryStore {
    async fn get_all(&self) -> Result<Ledger> {
        Ok(self.ledger.read().await.clone())
    }

    async fn get(&self, book_id: &str) -> Result<Option<BorrowRecord>> {
        Ok(self.ledger.read().await.get(book_id).cloned())
    }

    async fn set(&self, book_id: &str, record: BorrowRecord) -> Result<()> {
        self.ledger.write().await.insert(book_id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, book_id: &str) -> Result<bool> {
        Ok(self.ledger.write().await.remove(book_id).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.ledger.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LoanPeriod, parse_date};

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        let record = BorrowRecord::new("Sam", parse_date("2024-05-31").unwrap(), LoanPeriod::default()).unwrap();
        store.set("b1", record.clone()).await.unwrap();
        assert_eq!(store.get("b1").await.unwrap(), Some(record));
        assert!(store.delete("b1").await.unwrap());
        assert!(store.get_all().await.unwrap().is_empty());

        store.set("b2", BorrowRecord::new("Kim", parse_date("2024-06-01").unwrap(), LoanPeriod::default()).unwrap()).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get("b2").await.unwrap(), None);
    }
}
