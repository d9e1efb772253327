//! Core traits for the Pi-hole sync system
//!
//! - [`RecordStore`]: list/create/delete primitives against the record store
//! - [`RecordStoreFactory`]: builds a store from configuration

pub mod record_store;

pub use record_store::{RecordStore, RecordStoreFactory};
