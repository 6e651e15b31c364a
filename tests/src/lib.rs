//! # Ledger-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-subsystem scenarios through the Ledger facade
//!     ├── fixtures.rs   # Ledger builders, key helpers, raw record tampering
//!     ├── scenarios.rs  # Chain, authorization and rollback properties
//!     ├── tamper.rs     # Persisted-record tampering detected on reopen
//!     ├── transfer.rs   # Export/import across ledgers
//!     └── concurrency.rs
//! tests/benches/        # Append and validation throughput (criterion)
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lc-tests
//! cargo test -p lc-tests integration::tamper::
//! cargo bench -p lc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
