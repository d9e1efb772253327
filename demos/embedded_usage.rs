//! Minimal embedding example for pihole-sync-core
//!
//! Drives the provider against a custom record store that wraps the
//! in-memory store and prints every call, so the create/delete calls a
//! change plan turns into are visible.

use pihole_sync_core::{
    ApiVersion, Changes, MemoryRecordStore, PiholeProvider, Record, RecordStore, RecordType,
    Result,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Record store that logs each call before delegating
struct EmbeddedStore {
    inner: MemoryRecordStore,
    write_calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl RecordStore for EmbeddedStore {
    async fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>> {
        self.inner.list_records(record_type).await
    }

    async fn create_record(&self, record: &Record) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] create {}", record);
        self.inner.create_record(record).await
    }

    async fn delete_record(&self, record: &Record) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        println!("[Embedded] delete {}", record);
        self.inner.delete_record(record).await
    }
}

fn a(name: &str, targets: &[&str]) -> Record {
    Record::new(name, RecordType::A, targets.iter().copied())
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded pihole-sync-core Example ===\n");

    let write_calls = Arc::new(AtomicUsize::new(0));
    let store = EmbeddedStore {
        inner: MemoryRecordStore::with_records(vec![
            a("nas.lan", &["192.168.1.10"]),
            a("printer.lan", &["192.168.1.20"]),
            Record::new("files.lan", RecordType::Cname, ["nas.lan"]),
        ]),
        write_calls: write_calls.clone(),
    };
    let provider = PiholeProvider::with_store(Box::new(store), ApiVersion::V6);

    println!("Initial records:");
    for record in provider.records().await? {
        println!("  {}", record);
    }

    // nas.lan gains a second address, printer.lan is unchanged, media.lan is new
    let changes = Changes {
        create: vec![a("media.lan", &["192.168.1.30"])],
        update_old: vec![
            a("nas.lan", &["192.168.1.10"]),
            a("printer.lan", &["192.168.1.20"]),
        ],
        update_new: vec![
            a("nas.lan", &["192.168.1.10"]),
            a("nas.lan", &["192.168.1.11"]),
            a("printer.lan", &["192.168.1.20"]),
        ],
        ..Changes::default()
    };

    println!("\nApplying change plan:");
    provider.apply_changes(&changes).await?;

    println!("\nRecords after apply:");
    for record in provider.records().await? {
        println!("  {}", record);
    }

    println!(
        "\n{} store write call(s) issued",
        write_calls.load(Ordering::SeqCst)
    );

    Ok(())
}
