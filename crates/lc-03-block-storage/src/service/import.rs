//! Whole-chain replacement for import.

use super::helpers::{block_key, chain_len_ops, encode_block, load_range, unpinned};
use super::{BlockStore, ChainState};
use crate::domain::block::Block;
use crate::domain::errors::BlockStoreError;
use lc_01_key_registry::AuthorizedKey;
use shared_types::{short_hash, BatchOperation, Hash};
use std::collections::HashSet;
use tracing::{info, warn};

impl BlockStore {
    /// Replace the chain, the registry and the off-chain blobs in one commit.
    ///
    /// `blobs` are raw stored blob bytes; each is published under its SHA-256.
    /// Block and registry records go out in a single atomic batch. If that
    /// batch fails, blobs published by this call are withdrawn and nothing
    /// else has changed. Blobs only the outgoing chain referenced are deleted
    /// after the commit, unless they were pinned by `store_off_chain`.
    ///
    /// Callers are expected to have validated `blocks` already.
    pub fn replace_chain(
        &self,
        blocks: Vec<Block>,
        registry_entries: Vec<AuthorizedKey>,
        blobs: &[Vec<u8>],
    ) -> Result<(), BlockStoreError> {
        let mut chain = self.chain.write();
        let old_len = chain.len;
        let new_len = blocks.len() as u64;

        let outgoing = self.referenced_blobs(old_len)?;
        let incoming: HashSet<Hash> = blocks
            .iter()
            .filter_map(|b| b.off_chain_reference().map(|r| r.blob_id))
            .collect();
        let released = unpinned(
            self.kv.as_ref(),
            outgoing.difference(&incoming).copied(),
        )?;

        let mut operations = Vec::with_capacity(blocks.len() + 2);
        for (position, block) in blocks.iter().enumerate() {
            operations.push(BatchOperation::put(
                block_key(position as u64),
                encode_block(block)?,
            ));
        }
        for stale in new_len..old_len {
            operations.push(BatchOperation::delete(block_key(stale)));
        }
        operations.extend(chain_len_ops(new_len));

        let mut published = Vec::new();
        let mut result: Result<(), BlockStoreError> = Ok(());
        for bytes in blobs {
            let blob_id = shared_crypto::sha256(bytes);
            let existed = self.off_chain.contains(&blob_id);
            match self.off_chain.insert_raw(bytes) {
                Ok(_) if !existed => published.push(blob_id),
                Ok(_) => {}
                Err(e) => {
                    result = Err(e.into());
                    break;
                }
            }
        }

        if result.is_ok() {
            result = self.registry.replace_entries(registry_entries, |registry_ops| {
                operations.extend(registry_ops);
                self.kv
                    .atomic_batch_write(operations)
                    .map_err(BlockStoreError::from)
            });
        }

        if let Err(e) = result {
            for blob_id in &published {
                if let Err(cleanup) = self.off_chain.delete(blob_id) {
                    warn!(
                        "[lc-03] ⚠️ Failed to withdraw imported blob {}: {}",
                        short_hash(blob_id),
                        cleanup
                    );
                }
            }
            return Err(e);
        }

        *chain = ChainState::from_tip(new_len, blocks.last());

        for blob_id in &released {
            if let Err(e) = self.off_chain.delete(blob_id) {
                warn!(
                    "[lc-03] ⚠️ Imported but could not delete stale blob {}: {}",
                    short_hash(blob_id),
                    e
                );
            }
        }

        info!(
            "[lc-03] 📥 Replaced chain: {} -> {} blocks, {} blobs published, {} released",
            old_len,
            new_len,
            published.len(),
            released.len()
        );
        Ok(())
    }

    fn referenced_blobs(&self, len: u64) -> Result<HashSet<Hash>, BlockStoreError> {
        let batch_size = self.config.effective_batch_size() as u64;
        let mut referenced = HashSet::new();
        let mut start = 0;
        while start < len {
            let end = (start + batch_size).min(len);
            for block in load_range(self.kv.as_ref(), start, end)? {
                if let Some(reference) = block.off_chain_reference() {
                    referenced.insert(reference.blob_id);
                }
            }
            start = end;
        }
        Ok(referenced)
    }
}
