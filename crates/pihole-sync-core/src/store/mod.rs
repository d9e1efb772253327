//! Record store implementations shipped with the core
//!
//! Remote API stores live in the `pihole-sync-http` crate.

pub mod memory;

pub use memory::MemoryRecordStore;
