//! Record encoding and raw KV access. Nothing here locks.

use crate::domain::block::Block;
use crate::domain::errors::BlockStoreError;
use shared_types::{BatchOperation, Hash, KeyValueStore};

/// Key prefix for block records: `b:` followed by the big-endian block number.
pub const BLOCK_KEY_PREFIX: &[u8] = b"b:";

/// Chain length marker, written in the same batch as every append.
const CHAIN_LEN_KEY: &[u8] = b"m:chain_len";

/// Marks an off-chain blob stored on its own: `p:` followed by the blob id.
/// Pinned blobs outlive every block that shares them.
pub const PINNED_BLOB_PREFIX: &[u8] = b"p:";

pub(crate) fn pin_key(blob_id: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(PINNED_BLOB_PREFIX.len() + blob_id.len());
    key.extend_from_slice(PINNED_BLOB_PREFIX);
    key.extend_from_slice(blob_id);
    key
}

/// Drop pinned ids from a set of blobs about to be released.
pub(crate) fn unpinned(
    kv: &dyn KeyValueStore,
    blob_ids: impl IntoIterator<Item = Hash>,
) -> Result<Vec<Hash>, BlockStoreError> {
    let mut released = Vec::new();
    for blob_id in blob_ids {
        if !kv.exists(&pin_key(&blob_id))? {
            released.push(blob_id);
        }
    }
    Ok(released)
}

pub(crate) fn block_key(block_number: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(BLOCK_KEY_PREFIX.len() + 8);
    key.extend_from_slice(BLOCK_KEY_PREFIX);
    key.extend_from_slice(&block_number.to_be_bytes());
    key
}

pub(crate) fn encode_block(block: &Block) -> Result<Vec<u8>, BlockStoreError> {
    bincode::serialize(block).map_err(|e| BlockStoreError::Serialization {
        message: e.to_string(),
    })
}

pub(crate) fn decode_block(bytes: &[u8]) -> Result<Block, BlockStoreError> {
    bincode::deserialize(bytes).map_err(|e| BlockStoreError::Serialization {
        message: e.to_string(),
    })
}

pub(crate) fn chain_len_ops(len: u64) -> Vec<BatchOperation> {
    vec![BatchOperation::put(CHAIN_LEN_KEY, len.to_be_bytes().to_vec())]
}

pub(crate) fn read_chain_len(kv: &dyn KeyValueStore) -> Result<u64, BlockStoreError> {
    match kv.get(CHAIN_LEN_KEY)? {
        None => Ok(0),
        Some(bytes) => {
            let raw: [u8; 8] =
                bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| BlockStoreError::Serialization {
                        message: format!("chain length marker has {} bytes", bytes.len()),
                    })?;
            Ok(u64::from_be_bytes(raw))
        }
    }
}

/// Load a block that the chain state says exists.
///
/// A missing record under a committed number is corruption, not "not found".
pub(crate) fn load_block(kv: &dyn KeyValueStore, block_number: u64) -> Result<Block, BlockStoreError> {
    let bytes = kv
        .get(&block_key(block_number))?
        .ok_or_else(|| BlockStoreError::Serialization {
            message: format!("block #{block_number} is missing from storage"),
        })?;
    decode_block(&bytes)
}

/// Load blocks `start..end`.
pub(crate) fn load_range(
    kv: &dyn KeyValueStore,
    start: u64,
    end: u64,
) -> Result<Vec<Block>, BlockStoreError> {
    (start..end).map(|n| load_block(kv, n)).collect()
}
