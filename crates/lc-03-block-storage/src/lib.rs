//! # Block Storage (lc-03)
//!
//! Append-only, hash-linked sequence of signed blocks.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Contiguity | `block[i].block_number == i` |
//! | Linkage | `block[0].previous_hash` is the zero sentinel; `block[i].previous_hash == block[i-1].hash` |
//! | Authorization | The signer is authorized at the block timestamp when the block is appended |
//! | Atomicity | Append, rollback and import either fully commit or leave no trace |
//! | Genesis | Rollback never removes block 0 |
//!
//! ## Crate Structure
//!
//! - `domain/` - Block entity and canonical payload, options, rollback
//!   planning, search predicates, configuration, errors
//! - `service/` - `BlockStore`: append, rollback, import, queries and batch
//!   iteration over the shared `KeyValueStore`

pub mod domain;
pub mod service;

pub use domain::block::{signing_payload, Block, BlockPayload};
pub use domain::config::BlockStoreConfig;
pub use domain::errors::BlockStoreError;
pub use domain::options::BlockOptions;
pub use domain::rollback::{RollbackReport, RollbackRequest};
pub use domain::search::SearchQuery;
pub use service::{
    BlockBatches, BlockStore, BlockStoreDependencies, BLOCK_KEY_PREFIX, PINNED_BLOB_PREFIX,
};
