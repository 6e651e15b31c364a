//! # Off-Chain Storage (lc-02)
//!
//! Content-addressed storage for payloads too large to inline in a block.
//! A block carries an `OffChainReference`; the bytes live in a `BlobStore`.
//!
//! ## Identity
//!
//! | Field | Digest of |
//! |-------|-----------|
//! | `blob_id` | the stored bytes (ciphertext envelope when encrypted) |
//! | `content_hash` | the plaintext |
//!
//! Retrieval checks both: the blob id first (storage corruption), then the
//! content hash after decryption (wrong payload).
//!
//! ## Concurrency
//!
//! Operations on distinct blobs run in parallel. Deletion takes the index write
//! lock, so it waits for in-flight retrievals and no retrieval starts once it
//! has begun.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileBlobStore, InMemoryBlobStore};
pub use domain::entities::{BlobHealth, OffChainConfig, OffChainReference};
pub use domain::errors::{BlobStoreError, OffChainError};
pub use ports::BlobStore;
pub use service::OffChainStore;
