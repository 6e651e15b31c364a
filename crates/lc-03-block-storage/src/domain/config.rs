//! # Block Store Configuration

use lc_02_offchain_storage::domain::entities::DEFAULT_MAX_PAYLOAD_BYTES;

/// Payloads larger than this go off-chain (512 KiB).
pub const DEFAULT_OFF_CHAIN_THRESHOLD_BYTES: u64 = 512 * 1024;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_KEYWORDS: usize = 32;
pub const DEFAULT_MAX_METADATA_ENTRIES: usize = 64;

/// Configuration for the block store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStoreConfig {
    /// Payloads strictly larger than this are stored off-chain.
    pub off_chain_threshold_bytes: u64,
    /// Largest payload accepted at all.
    pub max_off_chain_bytes: u64,
    /// Blocks per batch for batch iteration and scans.
    pub batch_size: usize,
    pub max_keywords: usize,
    pub max_metadata_entries: usize,
}

impl Default for BlockStoreConfig {
    fn default() -> Self {
        Self {
            off_chain_threshold_bytes: DEFAULT_OFF_CHAIN_THRESHOLD_BYTES,
            max_off_chain_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            batch_size: DEFAULT_BATCH_SIZE,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            max_metadata_entries: DEFAULT_MAX_METADATA_ENTRIES,
        }
    }
}

impl BlockStoreConfig {
    pub fn with_off_chain_threshold(mut self, bytes: u64) -> Self {
        self.off_chain_threshold_bytes = bytes;
        self
    }

    pub fn with_max_off_chain_bytes(mut self, bytes: u64) -> Self {
        self.max_off_chain_bytes = bytes;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    pub fn with_max_metadata_entries(mut self, max_entries: usize) -> Self {
        self.max_metadata_entries = max_entries;
        self
    }

    /// Batch size, never zero.
    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
