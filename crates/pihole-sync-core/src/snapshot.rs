//! Record snapshot builder
//!
//! Assembles the current view of DNS state by listing every supported
//! record type, in [`RecordType::SUPPORTED`] order, and concatenating the
//! results. The first failing type aborts the snapshot and its error is
//! returned as-is, so a failed read can never look like an empty store.

use crate::error::Result;
use crate::record::{Record, RecordType};
use crate::traits::RecordStore;
use tracing::debug;

/// List all records of all supported types
///
/// # Returns
///
/// - `Ok(Vec<Record>)`: Records grouped by type in enumeration order; the
///   order within one type is whatever the store returned
/// - `Err(Error)`: The first store error, unchanged
pub async fn list_all(store: &dyn RecordStore) -> Result<Vec<Record>> {
    let mut records = Vec::new();

    for record_type in RecordType::SUPPORTED {
        let listed = store.list_records(record_type).await?;
        debug!("Listed {} {} record(s)", listed.len(), record_type);
        records.extend(listed);
    }

    Ok(records)
}
