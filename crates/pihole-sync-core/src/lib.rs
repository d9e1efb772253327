// # pihole-sync-core
//
// Reconciliation core for synchronizing a declarative DNS change plan
// against a Pi-hole record store.
//
// ## Architecture Overview
//
// - **RecordStore**: Capability trait with list/create/delete against the store
// - **snapshot**: Builds the current record view, one list call per type
// - **resolver**: Turns a change plan into the minimal create/delete calls,
//   merging multi-target updates per (name, type) key
// - **PiholeProvider**: Facade wiring configuration, snapshot and resolver
// - **StoreRegistry**: Plugin-based registry of stores per API version
//
// ## Design Principles
//
// 1. **Pure core**: Plan resolution is a pure function, I/O lives in a thin adapter
// 2. **Plugin-Based**: API versions are store implementations, not branches
// 3. **Transparent errors**: Store errors reach the caller unchanged
// 4. **Single writer**: One reconciliation cycle at a time per provider

pub mod changes;
pub mod config;
pub mod error;
pub mod provider;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod snapshot;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use changes::Changes;
pub use config::{ApiVersion, ProviderConfig};
pub use error::{Error, Result};
pub use provider::PiholeProvider;
pub use record::{Record, RecordKey, RecordType};
pub use registry::StoreRegistry;
pub use resolver::{Operation, ResolvedPlan};
pub use store::MemoryRecordStore;
pub use traits::{RecordStore, RecordStoreFactory};
