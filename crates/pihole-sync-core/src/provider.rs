//! Provider facade
//!
//! [`PiholeProvider`] is the public surface of the crate. It validates the
//! configuration, owns the record store, and routes reads to the snapshot
//! builder and writes to the change plan resolver.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌────────────────┐
//!   records() ────▶│ PiholeProvider │◀──── apply_changes(plan)
//!                  └────────────────┘
//!                     │          │
//!                     ▼          ▼
//!           ┌──────────────┐  ┌──────────────┐
//!           │  snapshot    │  │  resolver    │
//!           │  list_all()  │  │  apply()     │
//!           └──────────────┘  └──────────────┘
//!                     │          │
//!                     ▼          ▼
//!                  ┌────────────────┐
//!                  │  RecordStore   │  list / create / delete
//!                  └────────────────┘
//! ```

use crate::changes::Changes;
use crate::config::{ApiVersion, ProviderConfig};
use crate::error::Result;
use crate::record::Record;
use crate::registry::StoreRegistry;
use crate::traits::RecordStore;
use crate::{resolver, snapshot};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// DNS provider backed by a Pi-hole record store
///
/// ## Concurrency
///
/// The remote store has no transactions, so `records()` and
/// `apply_changes()` hold one async lock for their whole duration. Calls
/// against the same provider run one after another; store calls are never
/// issued concurrently.
pub struct PiholeProvider {
    /// Record store for list/create/delete
    store: Box<dyn RecordStore>,

    /// Remote API version the store speaks
    api_version: ApiVersion,

    /// Serializes reconciliation cycles
    cycle: Mutex<()>,
}

impl PiholeProvider {
    /// Create a provider from configuration
    ///
    /// The configuration is validated before the registry is consulted, so
    /// an unsupported API version fails without creating a store.
    ///
    /// # Parameters
    ///
    /// - `config`: Provider configuration
    /// - `registry`: Registry with a store factory for the configured version
    pub fn new(config: &ProviderConfig, registry: &StoreRegistry) -> Result<Self> {
        let api_version = config.validate()?;
        let store = registry.create_store(config)?;

        info!(
            "Pi-hole provider configured for {} (API v{})",
            config.server, api_version
        );

        Ok(Self::with_store(store, api_version))
    }

    /// Create a provider around an existing record store
    pub fn with_store(store: Box<dyn RecordStore>, api_version: ApiVersion) -> Self {
        Self {
            store,
            api_version,
            cycle: Mutex::new(()),
        }
    }

    /// The remote API version this provider talks to
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Current records of all supported types
    ///
    /// Fails with the first store error; no partial snapshot is returned.
    pub async fn records(&self) -> Result<Vec<Record>> {
        let _cycle = self.cycle.lock().await;
        snapshot::list_all(self.store.as_ref()).await
    }

    /// Apply a change plan
    ///
    /// Stops at the first failing store call and returns its error
    /// unchanged. Calls issued before the failure are not rolled back.
    pub async fn apply_changes(&self, changes: &Changes) -> Result<()> {
        if changes.is_empty() {
            debug!("Empty change plan, nothing to apply");
            return Ok(());
        }

        let _cycle = self.cycle.lock().await;
        resolver::apply(self.store.as_ref(), changes).await
    }
}

impl std::fmt::Debug for PiholeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiholeProvider")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}
