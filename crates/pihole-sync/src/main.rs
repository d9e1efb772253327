// # pihole-sync
//
// Thin command-line integration layer around `pihole-sync-core`.
//
// RULES:
// - No reconciliation logic here; plan resolution lives in pihole-sync-core
// - Remote API details live in pihole-sync-http
//
// The binary is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Registering record stores and building the provider
// 4. Running one `records` or `apply` cycle
//
// ## Configuration
//
// Every option can be given as a flag or an environment variable:
//
// - `PIHOLE_SERVER`: Pi-hole address (`pi.hole`, `https://192.168.1.2`)
// - `PIHOLE_API_VERSION`: `5` or `6` (default `6`)
// - `PIHOLE_PASSWORD`: Web password (v6) or API token (v5)
// - `PIHOLE_TLS_INSECURE_SKIP_VERIFY`: Accept invalid TLS certificates
// - `PIHOLE_DRY_RUN`: Read from the Pi-hole but only log writes
// - `PIHOLE_DOMAIN_FILTER`: Comma-separated domain suffixes to manage
// - `PIHOLE_SYNC_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//
// ## Example
//
// ```bash
// export PIHOLE_SERVER=pi.hole
// export PIHOLE_PASSWORD=your_password
//
// pihole-sync records
// pihole-sync apply --plan changes.json
// ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pihole_sync_core::{ApiVersion, Changes, MemoryRecordStore, PiholeProvider, ProviderConfig};
use std::io::Read;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration or input error
/// - 2: Runtime error (store call failed, interrupted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Inspect and apply DNS change plans against a Pi-hole
#[derive(Debug, Parser)]
#[command(name = "pihole-sync", version, propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Pi-hole server address
    #[arg(long, env = "PIHOLE_SERVER", global = true, default_value = "")]
    server: String,

    /// Management API version (5 or 6)
    #[arg(long, env = "PIHOLE_API_VERSION", global = true, default_value = "6")]
    api_version: String,

    /// Web password (v6) or API token (v5)
    #[arg(long, env = "PIHOLE_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long, env = "PIHOLE_TLS_INSECURE_SKIP_VERIFY", global = true)]
    tls_insecure_skip_verify: bool,

    /// Read from the Pi-hole but only log writes
    #[arg(long, env = "PIHOLE_DRY_RUN", global = true)]
    dry_run: bool,

    /// Domain suffixes to manage (comma-separated)
    #[arg(long, env = "PIHOLE_DOMAIN_FILTER", global = true, value_delimiter = ',')]
    domain_filter: Vec<String>,

    /// Log level
    #[arg(long, env = "PIHOLE_SYNC_LOG_LEVEL", global = true, default_value = "info")]
    log_level: String,

    /// Use an empty in-memory store instead of a Pi-hole
    #[arg(long, global = true)]
    memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print all managed records as JSON
    Records,

    /// Apply a change plan
    Apply {
        /// Change plan JSON file, `-` for stdin
        #[arg(long, default_value = "-")]
        plan: String,
    },
}

impl GlobalOpts {
    fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::new(self.server.clone(), self.api_version.clone())
            .with_dry_run(self.dry_run)
            .with_domain_filter(
                self.domain_filter
                    .iter()
                    .map(|d| d.trim())
                    .filter(|d| !d.is_empty()),
            );
        config.tls_insecure_skip_verify = self.tls_insecure_skip_verify;
        if let Some(password) = self.password.as_deref() {
            config = config.with_password(password);
        }
        config
    }
}

/// Work to run once the provider is built
enum Job {
    Records,
    Apply(Changes),
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "PIHOLE_SYNC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Read a change plan from a file, or stdin for `-`
fn load_changes(source: &str) -> Result<Changes> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read change plan from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read change plan {}", source))?
    };

    parse_changes(&raw).with_context(|| format!("invalid change plan {}", source))
}

fn parse_changes(raw: &str) -> Result<Changes> {
    if raw.trim().is_empty() {
        return Ok(Changes::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Build the provider for the configured store
fn build_provider(opts: &GlobalOpts, config: &ProviderConfig) -> Result<PiholeProvider> {
    if opts.memory {
        let version: ApiVersion = config.api_version.parse()?;
        info!("Using in-memory record store");
        return Ok(PiholeProvider::with_store(
            Box::new(MemoryRecordStore::new()),
            version,
        ));
    }

    build_remote_provider(config)
}

#[cfg(feature = "http")]
fn build_remote_provider(config: &ProviderConfig) -> Result<PiholeProvider> {
    let registry = pihole_sync_core::StoreRegistry::new();
    pihole_sync_http::register(&registry);
    Ok(PiholeProvider::new(config, &registry)?)
}

#[cfg(not(feature = "http"))]
fn build_remote_provider(config: &ProviderConfig) -> Result<PiholeProvider> {
    config.validate()?;
    anyhow::bail!("built without Pi-hole API support; use --memory or enable the `http` feature")
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match parse_log_level(&cli.global.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let config = cli.global.provider_config();
    let provider = match build_provider(&cli.global, &config) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    let job = match cli.command {
        Command::Records => Job::Records,
        Command::Apply { plan } => match load_changes(&plan) {
            Ok(changes) => Job::Apply(changes),
            Err(e) => {
                eprintln!("Input error: {:#}", e);
                return SyncExitCode::ConfigError.into();
            }
        },
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        // Dropping the cycle on Ctrl-C cancels the in-flight store call
        let result = tokio::select! {
            result = run(&provider, job, cli.global.memory) => result,
            _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted")),
        };

        match result {
            Ok(()) => SyncExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                SyncExitCode::RuntimeError
            }
        }
    });

    code.into()
}

/// Run one cycle against the provider
async fn run(provider: &PiholeProvider, job: Job, print_result: bool) -> Result<()> {
    match job {
        Job::Records => {
            let records = provider.records().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Job::Apply(changes) => {
            let plan = pihole_sync_core::resolver::resolve(&changes);
            info!(
                "Applying change plan: {} operation(s) ({} create, {} delete)",
                plan.len(),
                plan.creates().count(),
                plan.deletes().count()
            );

            provider.apply_changes(&changes).await?;

            // An in-memory store is gone after exit, so show what it holds
            if print_result {
                let records = provider.records().await?;
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pihole_sync_core::{Record, RecordType};
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_args() {
        let cli = Cli::try_parse_from([
            "pihole-sync",
            "apply",
            "--plan",
            "changes.json",
            "--server",
            "pi.hole",
            "--api-version",
            "5",
            "--domain-filter",
            "lan,example.com",
            "--dry-run",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Apply { ref plan } if plan == "changes.json"));

        let config = cli.global.provider_config();
        assert_eq!(config.server, "pi.hole");
        assert_eq!(config.api_version, "5");
        assert_eq!(config.domain_filter, vec!["lan", "example.com"]);
        assert!(config.dry_run);
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_load_changes_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "create": [{{"dnsName": "nas.lan", "recordType": "A", "targets": ["10.0.0.1"]}}],
                "updateOld": [{{"dnsName": "www.lan", "recordType": "CNAME", "targets": ["old.lan"]}}],
                "updateNew": [{{"dnsName": "www.lan", "recordType": "CNAME", "targets": ["nas.lan"]}}]
            }}"#
        )
        .unwrap();

        let changes = load_changes(file.path().to_str().unwrap()).unwrap();
        assert_eq!(
            changes.create,
            vec![Record::new("nas.lan", RecordType::A, ["10.0.0.1"])]
        );
        assert_eq!(changes.update_new.len(), 1);
        assert!(changes.delete.is_empty());
    }

    #[test]
    fn test_load_changes_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_changes(file.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid change plan"));
    }

    #[test]
    fn test_load_changes_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(load_changes(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_empty_plan_text() {
        assert!(parse_changes("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_memory_provider_skips_server_check() {
        let cli = Cli::try_parse_from(["pihole-sync", "records", "--memory", "--server", ""]).unwrap();
        let provider = build_provider(&cli.global, &cli.global.provider_config()).unwrap();
        assert_eq!(provider.api_version(), ApiVersion::V6);
    }

    #[tokio::test]
    async fn test_apply_against_memory_store() {
        let provider =
            PiholeProvider::with_store(Box::new(MemoryRecordStore::new()), ApiVersion::V6);
        let changes = parse_changes(
            r#"{"create": [{"dnsName": "nas.lan", "recordType": "A", "targets": ["10.0.0.1"]}]}"#,
        )
        .unwrap();

        run(&provider, Job::Apply(changes), false).await.unwrap();
        assert_eq!(provider.records().await.unwrap().len(), 1);
    }
}
