// # Pi-hole v6 Record Store
//
// Talks to the JSON REST API served under `/api`.
//
// ## API Reference
//
// - Login: POST `/api/auth` with `{"password": "..."}`, the returned
//   session id is sent as `X-FTL-SID` on every later request
// - List hosts: GET `/api/config/dns/hosts` (entries `"<ip> <name>"`)
// - List CNAMEs: GET `/api/config/dns/cnameRecords` (entries `"<name>,<target>"`)
// - Add entry: PUT `/api/config/dns/<list>/<entry>`
// - Remove entry: DELETE `/api/config/dns/<list>/<entry>`
//
// ## Security Requirements
//
// - Password and session id NEVER appear in logs or Debug output
// - The session is requested lazily, so construction never touches the network

use async_trait::async_trait;
use pihole_sync_core::{Error, ProviderConfig, Record, RecordStore, RecordType, Result};
use reqwest::{Method, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::common::{self, DomainFilter};

const STORE_NAME: &str = "pihole-v6";

/// Header carrying the session id
const SESSION_HEADER: &str = "X-FTL-SID";

/// Local DNS list an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsList {
    Hosts,
    CnameRecords,
}

impl DnsList {
    fn for_type(record_type: RecordType) -> Self {
        match record_type {
            RecordType::A | RecordType::Aaaa => DnsList::Hosts,
            RecordType::Cname => DnsList::CnameRecords,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            DnsList::Hosts => "hosts",
            DnsList::CnameRecords => "cnameRecords",
        }
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    session: Session,
}

#[derive(Deserialize)]
struct Session {
    #[serde(default)]
    valid: bool,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ConfigResponse {
    config: ConfigSection,
}

#[derive(Deserialize)]
struct ConfigSection {
    dns: DnsSection,
}

#[derive(Deserialize)]
struct DnsSection {
    #[serde(default)]
    hosts: Vec<String>,
    #[serde(default, rename = "cnameRecords")]
    cname_records: Vec<String>,
}

/// Record store for the Pi-hole v6 API
///
/// # Dry-Run Mode
///
/// When `dry_run` is true the store still logs in and lists, but create
/// and delete only log the request they would have sent.
pub struct PiholeV6Client {
    base: Url,
    password: Option<String>,
    client: reqwest::Client,
    /// Cached session id, `None` until the first authenticated request
    session: Mutex<Option<String>>,
    filter: DomainFilter,
    dry_run: bool,
}

// Custom Debug implementation that hides the password and session
impl std::fmt::Debug for PiholeV6Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiholeV6Client")
            .field("base", &self.base.as_str())
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("filter", &self.filter)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl PiholeV6Client {
    /// Create a client from provider configuration
    ///
    /// No request is made until the first store call.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            base: common::base_url(&config.server)?,
            password: config.password.clone().filter(|p| !p.is_empty()),
            client: common::build_client(config.tls_insecure_skip_verify)?,
            session: Mutex::new(None),
            filter: DomainFilter::new(&config.domain_filter),
            dry_run: config.dry_run,
        })
    }

    /// Whether writes are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Session id for the next request, logging in if none is cached
    ///
    /// Without a password the API is assumed to be open and no session is used.
    async fn session_id(&self) -> Result<Option<String>> {
        let Some(password) = self.password.as_deref() else {
            return Ok(None);
        };

        let mut session = self.session.lock().await;
        if let Some(sid) = session.as_ref() {
            return Ok(Some(sid.clone()));
        }

        let url = common::endpoint(&self.base, &["api", "auth"])?;
        tracing::debug!("Logging in at {}", url);

        let response = self
            .client
            .post(url)
            .json(&AuthRequest { password })
            .send()
            .await
            .map_err(|e| common::transport_error(STORE_NAME, e))?;
        let response = common::check_status(STORE_NAME, response).await?;

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(STORE_NAME, format!("Failed to parse login response: {}", e)))?;

        match auth.session {
            Session { valid: true, sid: Some(sid), .. } => {
                tracing::debug!("Login successful");
                *session = Some(sid.clone());
                Ok(Some(sid))
            }
            Session { message, .. } => Err(Error::auth(format!(
                "{} login rejected: {}",
                STORE_NAME,
                message.unwrap_or_else(|| "no valid session returned".to_string())
            ))),
        }
    }

    /// Send one authenticated request
    ///
    /// A 401 on a cached session drops the session and retries once with
    /// a fresh login.
    async fn send(&self, method: Method, url: Url) -> Result<Response> {
        let mut retried = false;

        loop {
            let sid = self.session_id().await?;

            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(sid) = sid.as_deref() {
                request = request.header(SESSION_HEADER, sid);
            }

            let response = request
                .send()
                .await
                .map_err(|e| common::transport_error(STORE_NAME, e))?;

            if response.status() == StatusCode::UNAUTHORIZED && sid.is_some() && !retried {
                tracing::debug!("Session expired, logging in again");
                *self.session.lock().await = None;
                retried = true;
                continue;
            }

            return common::check_status(STORE_NAME, response).await;
        }
    }

    async fn fetch_list(&self, list: DnsList) -> Result<Vec<String>> {
        let url = common::endpoint(&self.base, &["api", "config", "dns", list.path()])?;
        let response = self.send(Method::GET, url).await?;

        let body: ConfigResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(STORE_NAME, format!("Failed to parse response: {}", e)))?;

        Ok(match list {
            DnsList::Hosts => body.config.dns.hosts,
            DnsList::CnameRecords => body.config.dns.cname_records,
        })
    }

    /// Issue one PUT/DELETE per target of `record`
    async fn write(&self, method: Method, record: &Record) -> Result<()> {
        common::check_targets(record)?;
        let list = DnsList::for_type(record.record_type);

        for target in &record.targets {
            let entry = entry_for(record.record_type, &record.name, target);
            let url = common::endpoint(
                &self.base,
                &["api", "config", "dns", list.path(), entry.as_str()],
            )?;

            if self.dry_run {
                tracing::info!("[DRY-RUN] Would send {} {}", method, url);
                continue;
            }

            self.send(method.clone(), url).await?;
            tracing::debug!("{} {} entry '{}'", method, list.path(), entry);
        }

        Ok(())
    }
}

/// Format one list entry as the API stores it
fn entry_for(record_type: RecordType, name: &str, target: &str) -> String {
    match record_type {
        RecordType::A | RecordType::Aaaa => format!("{} {}", target, name),
        RecordType::Cname => format!("{},{}", name, target),
    }
}

/// Parse `hosts` entries into `(name, ip)` pairs of one address family
///
/// An entry may list several names for one address. Entries that do not
/// start with an address are skipped.
fn parse_hosts(entries: &[String], record_type: RecordType) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for entry in entries {
        let mut fields = entry.split_whitespace();
        let Some(ip) = fields.next() else {
            continue;
        };

        if ip.parse::<std::net::IpAddr>().is_err() {
            tracing::warn!("Skipping unparsable hosts entry: {}", entry);
            continue;
        }

        if !common::is_address_of(record_type, ip) {
            continue;
        }

        pairs.extend(fields.map(|name| (name.to_string(), ip.to_string())));
    }

    pairs
}

/// Parse `cnameRecords` entries (`name,target[,ttl]`) into `(name, target)` pairs
fn parse_cnames(entries: &[String]) -> Vec<(String, String)> {
    entries
        .iter()
        .filter_map(|entry| {
            let mut fields = entry.split(',').map(str::trim);
            match (fields.next(), fields.next()) {
                (Some(name), Some(target)) if !name.is_empty() && !target.is_empty() => {
                    Some((name.to_string(), target.to_string()))
                }
                _ => {
                    tracing::warn!("Skipping unparsable cnameRecords entry: {}", entry);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl RecordStore for PiholeV6Client {
    async fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>> {
        let list = DnsList::for_type(record_type);
        let entries = self.fetch_list(list).await?;

        let pairs = match list {
            DnsList::Hosts => parse_hosts(&entries, record_type),
            DnsList::CnameRecords => parse_cnames(&entries),
        };

        let records = common::group_by_name(record_type, pairs, &self.filter);
        tracing::debug!("Listed {} {} records", records.len(), record_type);
        Ok(records)
    }

    async fn create_record(&self, record: &Record) -> Result<()> {
        self.write(Method::PUT, record).await
    }

    async fn delete_record(&self, record: &Record) -> Result<()> {
        self.write(Method::DELETE, record).await
    }
}
