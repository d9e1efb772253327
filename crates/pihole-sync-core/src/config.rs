//! Configuration types for the Pi-hole sync system
//!
//! [`ProviderConfig`] is the only configuration surface of the provider.
//! It is validated once, at construction time, before any store call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote management API version
///
/// This is a closed set: anything else fails construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// Legacy `admin/api.php` API
    V5,
    /// JSON REST API under `/api`
    V6,
}

impl ApiVersion {
    /// All supported versions, oldest first
    pub const SUPPORTED: [ApiVersion; 2] = [ApiVersion::V5, ApiVersion::V6];

    /// The version name as it appears in configuration (`"5"` or `"6"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V5 => "5",
            ApiVersion::V6 => "6",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(ApiVersion::V5),
            "6" => Ok(ApiVersion::V6),
            other => Err(crate::Error::config(format!(
                "unsupported API version: {} (supported: 5, 6)",
                other
            ))),
        }
    }
}

/// Provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Server address (e.g. "http://pi.hole" or "pi.hole")
    #[serde(default)]
    pub server: String,

    /// API version, "5" or "6"
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Web password (v6) or API token (v5)
    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub tls_insecure_skip_verify: bool,

    /// Perform reads but only log intended writes
    #[serde(default)]
    pub dry_run: bool,

    /// Domain suffixes to manage; empty means all
    #[serde(default)]
    pub domain_filter: Vec<String>,
}

// Keeps the password out of logs
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("server", &self.server)
            .field("api_version", &self.api_version)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .field("tls_insecure_skip_verify", &self.tls_insecure_skip_verify)
            .field("dry_run", &self.dry_run)
            .field("domain_filter", &self.domain_filter)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration for the given server and API version
    pub fn new(server: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            api_version: api_version.into(),
            password: None,
            tls_insecure_skip_verify: false,
            dry_run: false,
            domain_filter: Vec::new(),
        }
    }

    /// Set the password (v6) or API token (v5)
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Restrict managed records to the given domain suffixes
    pub fn with_domain_filter<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_filter = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration
    ///
    /// The API version is checked first, then the server address.
    ///
    /// # Returns
    ///
    /// - `Ok(ApiVersion)`: The parsed API version
    /// - `Err(Error::Config)`: Describes the first problem found
    pub fn validate(&self) -> Result<ApiVersion, crate::Error> {
        let version: ApiVersion = self.api_version.parse()?;

        if self.server.trim().is_empty() {
            return Err(crate::Error::config("no Pi-hole server address configured"));
        }

        if self.domain_filter.iter().any(|d| d.trim().is_empty()) {
            return Err(crate::Error::config("domain filter entries cannot be empty"));
        }

        Ok(version)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(String::new(), default_api_version())
    }
}

fn default_api_version() -> String {
    ApiVersion::V6.as_str().to_string()
}
