//! Pieces shared by both API versions
//!
//! HTTP client construction, server address handling, the domain filter,
//! status code mapping and regrouping of listed entries into records.

use pihole_sync_core::{Error, Record, RecordType, Result};
use reqwest::{Response, Url};
use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client used for every request of one store
pub fn build_client(tls_insecure_skip_verify: bool) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .user_agent(concat!("pihole-sync/", env!("CARGO_PKG_VERSION")));

    if tls_insecure_skip_verify {
        tracing::warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))
}

/// Parse the configured server address
///
/// A bare host such as `pi.hole` or `test.example.com` is taken as
/// `http://<host>`.
pub fn base_url(server: &str) -> Result<Url> {
    let server = server.trim().trim_end_matches('/');
    if server.is_empty() {
        return Err(Error::config("no Pi-hole server address configured"));
    }

    let with_scheme = if server.contains("://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::config(format!("invalid server address '{}': {}", server, e)))?;

    if url.cannot_be_a_base() {
        return Err(Error::config(format!("invalid server address '{}'", server)));
    }

    Ok(url)
}

/// Append path segments to the base URL, percent-encoding each one
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("invalid server address '{}'", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a non-success response to an error, pass a success through
pub async fn check_status(store: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    Err(match status.as_u16() {
        401 | 403 => Error::auth(format!("{} rejected the request ({}): {}", store, status, body)),
        404 => Error::not_found(format!("{} endpoint not found ({}): {}", store, status, body)),
        _ => Error::provider(store, format!("{} - {}", status, body)),
    })
}

/// Map a transport failure
pub fn transport_error(store: &str, err: reqwest::Error) -> Error {
    Error::http(format!("{} request failed: {}", store, err))
}

/// Domain suffixes a store is allowed to manage
///
/// An empty filter accepts every name. A suffix matches the domain itself
/// and any name below it, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFilter {
    suffixes: Vec<String>,
}

impl DomainFilter {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { suffixes }
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.suffixes.is_empty() {
            return true;
        }

        let name = name.trim_end_matches('.').to_ascii_lowercase();
        self.suffixes.iter().any(|suffix| {
            name == *suffix
                || (name.len() > suffix.len()
                    && name.ends_with(suffix.as_str())
                    && name.as_bytes()[name.len() - suffix.len() - 1] == b'.')
        })
    }
}

/// Whether `target` is an address of the family `record_type` stores
///
/// Always false for CNAME.
pub fn is_address_of(record_type: RecordType, target: &str) -> bool {
    match (record_type, target.parse::<IpAddr>()) {
        (RecordType::A, Ok(IpAddr::V4(_))) => true,
        (RecordType::Aaaa, Ok(IpAddr::V6(_))) => true,
        _ => false,
    }
}

/// Reject address records whose targets are not of the right family
pub fn check_targets(record: &Record) -> Result<()> {
    if record.targets.is_empty() {
        return Err(Error::invalid_input(format!("record {} has no targets", record)));
    }

    if record.record_type.is_address()
        && let Some(bad) = record
            .targets
            .iter()
            .find(|target| !is_address_of(record.record_type, target))
    {
        return Err(Error::invalid_input(format!(
            "'{}' is not a valid {} target for {}",
            bad, record.record_type, record.name
        )));
    }

    Ok(())
}

/// Group `(name, target)` pairs into one record per name
///
/// Names keep their first-seen order and spelling, targets keep their
/// order with duplicates dropped. Names outside `filter` are skipped.
pub fn group_by_name<I>(record_type: RecordType, entries: I, filter: &DomainFilter) -> Vec<Record>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut records: Vec<Record> = Vec::new();

    for (name, target) in entries {
        if !filter.matches(&name) {
            continue;
        }

        match records
            .iter_mut()
            .find(|record| record.name.eq_ignore_ascii_case(&name))
        {
            Some(record) => {
                if !record.targets.contains(&target) {
                    record.targets.push(target);
                }
            }
            None => records.push(Record::new(name, record_type, [target])),
        }
    }

    records
}
