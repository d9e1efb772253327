// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Purpose
//
// Holds records in insertion order and applies create/delete exactly as a
// strict remote store would: create appends the record as given, delete
// removes only records matching name, type and the full target list.
//
// ## When to Use
//
// - Testing the reconciliation core without a remote API
// - Previewing what a change plan does to a snapshot
// - Embedding examples

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::record::{Record, RecordType};
use crate::traits::RecordStore;
use crate::Error;

/// In-memory record store implementation
///
/// # Example
///
/// ```rust,no_run
/// use pihole_sync_core::store::MemoryRecordStore;
/// use pihole_sync_core::{Record, RecordStore, RecordType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///
///     store
///         .create_record(&Record::new("nas.lan", RecordType::A, ["192.168.1.10"]))
///         .await?;
///
///     let records = store.list_records(RecordType::A).await?;
///     assert_eq!(records.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Vec<Record>>>,
}

impl MemoryRecordStore {
    /// Create a new empty memory record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(records)),
        }
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Copy of every stored record, in insertion order
    pub async fn records(&self) -> Vec<Record> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .iter()
            .filter(|record| record.record_type == record_type)
            .cloned()
            .collect())
    }

    async fn create_record(&self, record: &Record) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.push(record.clone());
        Ok(())
    }

    async fn delete_record(&self, record: &Record) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.retain(|existing| !existing.matches(record));
        Ok(())
    }
}
