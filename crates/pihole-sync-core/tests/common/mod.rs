//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`RecordingStore`] behaves like a strict record store (create appends,
//! delete removes exact matches) and records every create/delete request
//! so tests can assert on call counts, order and content.

#![allow(dead_code)]

use async_trait::async_trait;
use pihole_sync_core::{Error, Record, RecordStore, RecordType, Result};
use std::sync::{Arc, Mutex};

/// Requests observed by a [`RecordingStore`]
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    pub create_requests: Vec<Record>,
    pub delete_requests: Vec<Record>,
    pub list_requests: Vec<RecordType>,
}

/// Failure injection for a [`RecordingStore`]
#[derive(Debug, Default, Clone)]
struct Triggers {
    /// Fail listing this type with an error whose message is `<TYPE>ERROR`
    list: Option<RecordType>,
    /// Fail creating a record with this name
    create: Option<String>,
    /// Fail deleting a record with this name
    delete: Option<String>,
}

/// A record store double that tracks calls
///
/// Clones share state, so a test can hand one clone to the provider and
/// inspect another.
#[derive(Debug, Default, Clone)]
pub struct RecordingStore {
    records: Arc<Mutex<Vec<Record>>>,
    requests: Arc<Mutex<RequestTracker>>,
    triggers: Arc<Mutex<Triggers>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records (not counted as requests)
    pub fn with_records(records: Vec<Record>) -> Self {
        let store = Self::new();
        *store.records.lock().unwrap() = records;
        store
    }

    /// Make listing `record_type` fail with `<TYPE>ERROR`
    pub fn fail_list(&self, record_type: RecordType) {
        self.triggers.lock().unwrap().list = Some(record_type);
    }

    /// Make creating a record named `name` fail with `CREATEERROR`
    pub fn fail_create(&self, name: &str) {
        self.triggers.lock().unwrap().create = Some(name.to_string());
    }

    /// Make deleting a record named `name` fail with `DELETEERROR`
    pub fn fail_delete(&self, name: &str) {
        self.triggers.lock().unwrap().delete = Some(name.to_string());
    }

    /// Remove all failure triggers
    pub fn clear_triggers(&self) {
        *self.triggers.lock().unwrap() = Triggers::default();
    }

    /// Snapshot of the observed requests
    pub fn requests(&self) -> RequestTracker {
        self.requests.lock().unwrap().clone()
    }

    /// Forget all observed requests
    pub fn clear_requests(&self) {
        *self.requests.lock().unwrap() = RequestTracker::default();
    }

    /// Current stored records, in insertion order
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>> {
        self.requests.lock().unwrap().list_requests.push(record_type);

        if self.triggers.lock().unwrap().list == Some(record_type) {
            return Err(Error::Other(format!("{}ERROR", record_type)));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.record_type == record_type)
            .cloned()
            .collect())
    }

    async fn create_record(&self, record: &Record) -> Result<()> {
        if self.triggers.lock().unwrap().create.as_deref() == Some(record.name.as_str()) {
            return Err(Error::Other("CREATEERROR".to_string()));
        }

        self.records.lock().unwrap().push(record.clone());
        self.requests.lock().unwrap().create_requests.push(record.clone());
        Ok(())
    }

    async fn delete_record(&self, record: &Record) -> Result<()> {
        if self.triggers.lock().unwrap().delete.as_deref() == Some(record.name.as_str()) {
            return Err(Error::Other("DELETEERROR".to_string()));
        }

        self.records
            .lock()
            .unwrap()
            .retain(|existing| !existing.matches(record));
        self.requests.lock().unwrap().delete_requests.push(record.clone());
        Ok(())
    }
}

/// Shorthand for an A record
pub fn a(name: &str, targets: &[&str]) -> Record {
    Record::new(name, RecordType::A, targets.iter().copied())
}

/// Shorthand for an AAAA record
pub fn aaaa(name: &str, targets: &[&str]) -> Record {
    Record::new(name, RecordType::Aaaa, targets.iter().copied())
}

/// Shorthand for a CNAME record
pub fn cname(name: &str, target: &str) -> Record {
    Record::new(name, RecordType::Cname, [target])
}

/// The six records of the end-to-end scenario: A and AAAA for test1..test3
pub fn six_records() -> Vec<Record> {
    vec![
        a("test1.example.com", &["192.168.1.1"]),
        a("test2.example.com", &["192.168.1.2"]),
        a("test3.example.com", &["192.168.1.3"]),
        aaaa("test1.example.com", &["fc00::1:192:168:1:1"]),
        aaaa("test2.example.com", &["fc00::1:192:168:1:2"]),
        aaaa("test3.example.com", &["fc00::1:192:168:1:3"]),
    ]
}
