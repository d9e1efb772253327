// # Pi-hole v5 Record Store
//
// Talks to the legacy `admin/api.php` endpoint.
//
// ## API Reference
//
// - Address records: GET `/admin/api.php?customdns&action=get|add|delete`
//   with `ip` and `domain` for writes
// - Canonical names: GET `/admin/api.php?customcname&action=get|add|delete`
//   with `domain` and `target` for writes
// - Every call carries the API token as the `auth` query parameter
// - List responses: `{"data": [[name, value], ...]}`
// - Write responses: `{"success": bool, "message": string}`
//
// The token is part of the URL, so URLs of this store are never logged.

use async_trait::async_trait;
use pihole_sync_core::{Error, ProviderConfig, Record, RecordStore, RecordType, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::common::{self, DomainFilter};

const STORE_NAME: &str = "pihole-v5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Get,
    Add,
    Delete,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Add => "add",
            Action::Delete => "delete",
        }
    }
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct WriteResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

/// Record store for the Pi-hole v5 API
pub struct PiholeV5Client {
    base: Url,
    token: Option<String>,
    client: reqwest::Client,
    filter: DomainFilter,
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for PiholeV5Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiholeV5Client")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .field("filter", &self.filter)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl PiholeV5Client {
    /// Create a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            base: common::base_url(&config.server)?,
            token: config.password.clone().filter(|p| !p.is_empty()),
            client: common::build_client(config.tls_insecure_skip_verify)?,
            filter: DomainFilter::new(&config.domain_filter),
            dry_run: config.dry_run,
        })
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Build the `api.php` URL for one call
    ///
    /// `params` are appended after the list selector and action; the
    /// token comes last.
    fn api_url(&self, record_type: RecordType, action: Action, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = common::endpoint(&self.base, &["admin", "api.php"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_key_only(list_selector(record_type));
            query.append_pair("action", action.as_str());
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(token) = self.token.as_deref() {
                query.append_pair("auth", token);
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| common::transport_error(STORE_NAME, e.without_url()))?;
        common::check_status(STORE_NAME, response).await
    }

    /// Issue one add/delete call per target of `record`
    async fn write(&self, action: Action, record: &Record) -> Result<()> {
        common::check_targets(record)?;

        for target in &record.targets {
            let params = write_params(record.record_type, &record.name, target);

            if self.dry_run {
                tracing::info!(
                    "[DRY-RUN] Would {} {} {} -> {}",
                    action.as_str(),
                    record.record_type,
                    record.name,
                    target
                );
                continue;
            }

            let url = self.api_url(record.record_type, action, &params)?;
            let body: WriteResponse = self
                .get(url)
                .await?
                .json()
                .await
                .map_err(|e| Error::provider(STORE_NAME, format!("Failed to parse response: {}", e)))?;

            if !body.success {
                return Err(Error::provider(
                    STORE_NAME,
                    format!(
                        "{} {} {} -> {} failed: {}",
                        action.as_str(),
                        record.record_type,
                        record.name,
                        target,
                        body.message
                    ),
                ));
            }

            tracing::debug!("{} {} {} -> {}", action.as_str(), record.record_type, record.name, target);
        }

        Ok(())
    }
}

/// Query key selecting the list a record type lives in
fn list_selector(record_type: RecordType) -> &'static str {
    match record_type {
        RecordType::A | RecordType::Aaaa => "customdns",
        RecordType::Cname => "customcname",
    }
}

/// Query parameters naming one entry of the list
fn write_params<'a>(record_type: RecordType, name: &'a str, target: &'a str) -> [(&'static str, &'a str); 2] {
    match record_type {
        RecordType::A | RecordType::Aaaa => [("ip", target), ("domain", name)],
        RecordType::Cname => [("domain", name), ("target", target)],
    }
}

/// Turn `data` rows into `(name, value)` pairs for `record_type`
///
/// `customdns` holds both address families, so rows of the other family
/// are dropped. Rows with fewer than two columns are skipped.
fn parse_rows(rows: Vec<Vec<String>>, record_type: RecordType) -> Vec<(String, String)> {
    rows.into_iter()
        .filter_map(|row| {
            let mut columns = row.into_iter();
            match (columns.next(), columns.next()) {
                (Some(name), Some(value)) => Some((name, value)),
                _ => {
                    tracing::warn!("Skipping malformed {} row", list_selector(record_type));
                    None
                }
            }
        })
        .filter(|(_, value)| !record_type.is_address() || common::is_address_of(record_type, value))
        .collect()
}

#[async_trait]
impl RecordStore for PiholeV5Client {
    async fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>> {
        let url = self.api_url(record_type, Action::Get, &[])?;
        let body: ListResponse = self
            .get(url)
            .await?
            .json()
            .await
            .map_err(|e| Error::provider(STORE_NAME, format!("Failed to parse response: {}", e)))?;

        let pairs = parse_rows(body.data, record_type);
        let records = common::group_by_name(record_type, pairs, &self.filter);
        tracing::debug!("Listed {} {} records", records.len(), record_type);
        Ok(records)
    }

    async fn create_record(&self, record: &Record) -> Result<()> {
        self.write(Action::Add, record).await
    }

    async fn delete_record(&self, record: &Record) -> Result<()> {
        self.write(Action::Delete, record).await
    }
}
