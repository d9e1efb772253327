// # Record Store Trait
//
// Defines the capability interface between the reconciliation core and the
// remote authoritative record store.
//
// ## Implementations
//
// - In-memory: `pihole_sync_core::store::MemoryRecordStore`
// - Pi-hole API v5 and v6: `pihole-sync-http` crate
//
// ## Usage
//
// ```rust,ignore
// use pihole_sync_core::{Record, RecordStore, RecordType};
//
// async fn example(store: &dyn RecordStore) -> pihole_sync_core::Result<()> {
//     let records = store.list_records(RecordType::A).await?;
//
//     store
//         .create_record(&Record::new("nas.lan", RecordType::A, ["192.168.1.10"]))
//         .await?;
//
//     Ok(())
// }
// ```

use crate::config::ProviderConfig;
use crate::record::{Record, RecordType};
use async_trait::async_trait;

/// Trait for record store implementations
///
/// This is the core's only boundary. Transport, authentication,
/// pagination and API-version-specific payloads all live behind it; a
/// different remote API version is a different implementation of this
/// trait.
///
/// # Contract
///
/// - `list_records` returns every record of the given type and must not
///   silently drop entries.
/// - `create_record` is not required to be idempotent. The core never
///   creates the same key twice within one plan.
/// - `delete_record` matches by full name, type and target list. Deleting
///   a record that matches nothing may be a no-op or an error, at the
///   store's discretion.
///
/// Errors are returned to the caller of the core unchanged, so
/// implementations should return distinguishable errors.
///
/// # Cancellation
///
/// Dropping the returned future cancels the call. Timeouts and retries are
/// the implementation's concern, never the core's.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List all records of the given type currently in the store
    async fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>, crate::Error>;

    /// Create a record with its full target list
    async fn create_record(&self, record: &Record) -> Result<(), crate::Error>;

    /// Delete the record matching the given name, type and target list
    async fn delete_record(&self, record: &Record) -> Result<(), crate::Error>;
}

/// Helper trait for constructing record stores from configuration
pub trait RecordStoreFactory: Send + Sync {
    /// Create a RecordStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Already validated provider configuration
    ///
    /// # Returns
    ///
    /// A boxed RecordStore trait object
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RecordStore>, crate::Error>;
}
