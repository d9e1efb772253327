//! Plugin-based record store registry
//!
//! The registry maps remote API versions to record store factories, so the
//! provider can be built from configuration without branching on the
//! version anywhere in the core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pihole_sync_core::registry::StoreRegistry;
//! use pihole_sync_core::config::ProviderConfig;
//!
//! let registry = StoreRegistry::new();
//!
//! // Register stores (normally done by `pihole_sync_http::register`)
//! registry.register_store(ApiVersion::V6, Box::new(V6Factory));
//!
//! // Create store from config
//! let config = ProviderConfig::new("http://pi.hole", "6");
//! let store = registry.create_store(&config)?;
//! ```

use crate::config::{ApiVersion, ProviderConfig};
use crate::error::{Error, Result};
use crate::traits::{RecordStore, RecordStoreFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Registry of record store factories keyed by API version
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<ApiVersion, Box<dyn RecordStoreFactory>>>,
}

impl StoreRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record store factory for an API version
    ///
    /// A later registration for the same version replaces the earlier one.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use pihole_sync_core::registry::StoreRegistry;
    /// # use pihole_sync_core::config::{ApiVersion, ProviderConfig};
    /// # use pihole_sync_core::traits::{RecordStore, RecordStoreFactory};
    /// # struct MyFactory;
    /// # impl RecordStoreFactory for MyFactory {
    /// #     fn create(&self, config: &ProviderConfig) -> pihole_sync_core::Result<Box<dyn RecordStore>> { unimplemented!() }
    /// # }
    /// let registry = StoreRegistry::new();
    /// registry.register_store(ApiVersion::V6, Box::new(MyFactory));
    /// ```
    pub fn register_store(&self, version: ApiVersion, factory: Box<dyn RecordStoreFactory>) {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        stores.insert(version, factory);
    }

    /// Create a record store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RecordStore>)`: Created store instance
    /// - `Err(Error)`: If the configuration is invalid, no store is
    ///   registered for its version, or creation fails
    pub fn create_store(&self, config: &ProviderConfig) -> Result<Box<dyn RecordStore>> {
        let version = config.validate()?;
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);

        let factory = stores.get(&version).ok_or_else(|| {
            Error::config(format!("No record store registered for API version {}", version))
        })?;

        factory.create(config)
    }

    /// List all API versions with a registered store, oldest first
    pub fn list_versions(&self) -> Vec<ApiVersion> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        ApiVersion::SUPPORTED
            .into_iter()
            .filter(|version| stores.contains_key(version))
            .collect()
    }

    /// Check if a store is registered for an API version
    pub fn has_version(&self, version: ApiVersion) -> bool {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.contains_key(&version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;

    struct MemoryFactory;

    impl RecordStoreFactory for MemoryFactory {
        fn create(&self, _config: &ProviderConfig) -> Result<Box<dyn RecordStore>> {
            Ok(Box::new(MemoryRecordStore::new()))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = StoreRegistry::new();

        // Initially empty
        assert!(!registry.has_version(ApiVersion::V6));
        assert!(registry.list_versions().is_empty());

        registry.register_store(ApiVersion::V6, Box::new(MemoryFactory));

        assert!(registry.has_version(ApiVersion::V6));
        assert!(!registry.has_version(ApiVersion::V5));
        assert_eq!(registry.list_versions(), vec![ApiVersion::V6]);
    }

    #[test]
    fn test_unregistered_version_fails() {
        let registry = StoreRegistry::new();
        registry.register_store(ApiVersion::V6, Box::new(MemoryFactory));

        let err = registry
            .create_store(&ProviderConfig::new("pi.hole", "5"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("API version 5"));
    }

    #[test]
    fn test_invalid_config_rejected_before_lookup() {
        let registry = StoreRegistry::new();
        registry.register_store(ApiVersion::V6, Box::new(MemoryFactory));

        let err = registry
            .create_store(&ProviderConfig::new("pi.hole", "7"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("unsupported API version"));
    }
}
