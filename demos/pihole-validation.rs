//! Read-only validation against a live Pi-hole
//!
//! Lists every record through the configured API version, then applies a
//! sample change plan in dry-run mode so the intended requests are logged
//! without touching the Pi-hole.
//!
//! ```bash
//! PIHOLE_SERVER=pi.hole PIHOLE_PASSWORD=... cargo run -p pihole-sync-demos --bin pihole_validation
//! ```

use pihole_sync_core::{Changes, PiholeProvider, ProviderConfig, Record, RecordType, StoreRegistry};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let server = match env::var("PIHOLE_SERVER") {
        Ok(server) => server,
        Err(_) => {
            eprintln!("PIHOLE_SERVER is required");
            return ExitCode::from(1);
        }
    };
    let api_version = env::var("PIHOLE_API_VERSION").unwrap_or_else(|_| "6".to_string());

    // Always dry-run: this tool must never modify the Pi-hole
    let mut config = ProviderConfig::new(server, api_version).with_dry_run(true);
    if let Ok(password) = env::var("PIHOLE_PASSWORD") {
        config = config.with_password(password);
    }
    config.tls_insecure_skip_verify = env::var("PIHOLE_TLS_INSECURE_SKIP_VERIFY")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let registry = StoreRegistry::new();
    pihole_sync_http::register(&registry);

    let provider = match PiholeProvider::new(&config, &registry) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(1);
        }
    };

    let records = match provider.records().await {
        Ok(records) => records,
        Err(e) => {
            error!("Listing failed: {}", e);
            return ExitCode::from(2);
        }
    };

    info!("Pi-hole holds {} record(s)", records.len());
    match serde_json::to_string_pretty(&records) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to render records: {}", e),
    }

    let probe = Record::new("pihole-sync-probe.lan", RecordType::A, ["192.0.2.1", "192.0.2.2"]);
    let changes = Changes {
        create: vec![probe.clone()],
        delete: vec![probe],
        ..Changes::default()
    };

    if let Err(e) = provider.apply_changes(&changes).await {
        error!("Dry-run apply failed: {}", e);
        return ExitCode::from(2);
    }

    info!("Validation complete");
    ExitCode::SUCCESS
}
