// # Pi-hole Record Stores
//
// `RecordStore` implementations for the Pi-hole management API.
//
// ## Versions
//
// - **v6** (`PiholeV6Client`): JSON REST API under `/api`, session login
// - **v5** (`PiholeV5Client`): legacy `admin/api.php`, API token
//
// Both are registered with a `StoreRegistry` through `register()`; the
// reconciliation core never branches on the version.
//
// ## Store Behavior
//
// - One HTTP request per target of a record (the API stores one value per entry)
// - Listed entries are regrouped into one record per name
// - HTTP timeout of 30 seconds
// - Errors are returned as-is; no retry, no backoff
// - Dry-run mode performs reads and only logs writes
//
// ## Security Requirements
//
// - Password/token NEVER appears in logs or Debug output

pub mod common;
pub mod v5;
pub mod v6;

pub use common::DomainFilter;
pub use v5::PiholeV5Client;
pub use v6::PiholeV6Client;

use pihole_sync_core::{ApiVersion, ProviderConfig, RecordStore, RecordStoreFactory, Result, StoreRegistry};

/// Factory for v5 record stores
pub struct PiholeV5Factory;

impl RecordStoreFactory for PiholeV5Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RecordStore>> {
        warn_dry_run(config);
        Ok(Box::new(PiholeV5Client::new(config)?))
    }
}

/// Factory for v6 record stores
pub struct PiholeV6Factory;

impl RecordStoreFactory for PiholeV6Factory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn RecordStore>> {
        warn_dry_run(config);
        Ok(Box::new(PiholeV6Client::new(config)?))
    }
}

fn warn_dry_run(config: &ProviderConfig) {
    if config.dry_run {
        tracing::warn!("Pi-hole store running in DRY-RUN mode - no changes will be made");
    }
}

/// Register both API versions with a registry
///
/// # Example
///
/// ```rust
/// use pihole_sync_core::{ApiVersion, StoreRegistry};
///
/// let registry = StoreRegistry::new();
/// pihole_sync_http::register(&registry);
/// assert!(registry.has_version(ApiVersion::V6));
/// ```
pub fn register(registry: &StoreRegistry) {
    registry.register_store(ApiVersion::V5, Box::new(PiholeV5Factory));
    registry.register_store(ApiVersion::V6, Box::new(PiholeV6Factory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pihole_sync_core::PiholeProvider;

    #[test]
    fn test_register_all_versions() {
        let registry = StoreRegistry::new();
        register(&registry);

        assert_eq!(registry.list_versions(), vec![ApiVersion::V5, ApiVersion::V6]);
    }

    #[test]
    fn test_factory_creation() {
        let config = ProviderConfig::new("test.example.com", "6").with_password("pw");
        assert!(PiholeV6Factory.create(&config).is_ok());

        let config = ProviderConfig::new("test.example.com", "5");
        assert!(PiholeV5Factory.create(&config).is_ok());
    }

    #[test]
    fn test_factory_rejects_bad_server() {
        let config = ProviderConfig::new("http://[not-an-address", "6");
        assert!(PiholeV6Factory.create(&config).is_err());
    }

    #[test]
    fn test_provider_from_registry() {
        let registry = StoreRegistry::new();
        register(&registry);

        let provider =
            PiholeProvider::new(&ProviderConfig::new("test.example.com", "6"), &registry).unwrap();
        assert_eq!(provider.api_version(), ApiVersion::V6);

        assert!(PiholeProvider::new(&ProviderConfig::new("test.example.com", "7"), &registry).is_err());
    }
}
