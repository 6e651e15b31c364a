//! # Shared Types Crate
//!
//! Primitive types and infrastructure ports shared by every Ledger-Chain
//! subsystem.
//!
//! ## Contents
//!
//! - `entities` - `Hash`, `Timestamp`, genesis sentinel, hex helpers
//! - `errors` - Cross-subsystem error classification (`ErrorKind`)
//! - `time` - Injectable time sources
//! - `storage` - Key-value storage port with in-memory and file-backed adapters

pub mod entities;
pub mod errors;
pub mod storage;
pub mod time;

pub use entities::*;
pub use errors::ErrorKind;
pub use storage::{
    BatchOperation, FileBackedKVStore, InMemoryKVStore, KVStoreError, KeyValueStore, ScanResult,
};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
