//! # Off-Chain Entities

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{hash_to_hex, Hash};

/// Default ceiling for a single off-chain payload (100 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Pointer from a block to externally stored bytes.
///
/// Immutable once created. Embedded in the block and covered by its hash.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffChainReference {
    /// SHA-256 of the stored bytes; the storage handle.
    #[serde_as(as = "Hex")]
    pub blob_id: Hash,
    /// SHA-256 of the plaintext payload.
    #[serde_as(as = "Hex")]
    pub content_hash: Hash,
    /// Plaintext size.
    pub size_bytes: u64,
    /// Whether the stored bytes are a sealed envelope.
    pub encrypted: bool,
    /// Encoded public key the payload was sealed for.
    pub recipient: Option<String>,
}

impl OffChainReference {
    pub fn blob_id_hex(&self) -> String {
        hash_to_hex(&self.blob_id)
    }

    pub fn content_hash_hex(&self) -> String {
        hash_to_hex(&self.content_hash)
    }
}

/// Result of auditing one reference against the blob store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobHealth {
    Healthy,
    Missing,
    /// Stored bytes no longer match the reference.
    Corrupted,
}

/// Off-chain store configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffChainConfig {
    /// Largest plaintext accepted by `store`.
    pub max_payload_bytes: u64,
}

impl Default for OffChainConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl OffChainConfig {
    pub fn with_max_payload_bytes(mut self, max_payload_bytes: u64) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }
}
