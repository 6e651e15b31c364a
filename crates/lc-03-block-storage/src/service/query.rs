//! Read-side operations. Each takes the chain read lock once.

use super::helpers::{load_block, load_range};
use super::{BlockStore, ChainState};
use crate::domain::block::Block;
use crate::domain::errors::BlockStoreError;
use crate::domain::search::SearchQuery;
use lc_02_offchain_storage::OffChainReference;
use parking_lot::RwLockReadGuard;
use shared_types::Hash;
use std::ops::Range;

/// Lazy, restartable iteration over the chain in bounded batches.
///
/// Holds the chain read lock for its lifetime, so every batch comes from the
/// same committed chain. Drop it before appending on the same thread.
pub struct BlockBatches<'a> {
    store: &'a BlockStore,
    _guard: RwLockReadGuard<'a, ChainState>,
    len: u64,
    next: u64,
    batch_size: u64,
}

impl<'a> BlockBatches<'a> {
    /// Number of blocks the iteration covers.
    pub fn chain_len(&self) -> u64 {
        self.len
    }

    /// Start again from block 0.
    pub fn rewind(&mut self) {
        self.next = 0;
    }

    /// Load a single block from the locked chain.
    pub fn block(&self, block_number: u64) -> Result<Block, BlockStoreError> {
        if block_number >= self.len {
            return Err(BlockStoreError::BlockNotFound { block_number });
        }
        load_block(self.store.kv.as_ref(), block_number)
    }
}

impl Iterator for BlockBatches<'_> {
    type Item = Result<Vec<Block>, BlockStoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let end = (self.next + self.batch_size).min(self.len);
        let batch = load_range(self.store.kv.as_ref(), self.next, end);
        // A failed batch ends the iteration
        self.next = if batch.is_ok() { end } else { self.len };
        Some(batch)
    }
}

impl BlockStore {
    pub fn block_count(&self) -> u64 {
        self.chain.read().len
    }

    /// Block by number.
    pub fn get_block(&self, block_number: u64) -> Result<Block, BlockStoreError> {
        let chain = self.chain.read();
        if block_number >= chain.len {
            return Err(BlockStoreError::BlockNotFound { block_number });
        }
        load_block(self.kv.as_ref(), block_number)
    }

    pub fn last_block(&self) -> Result<Option<Block>, BlockStoreError> {
        let chain = self.chain.read();
        match chain.len {
            0 => Ok(None),
            len => load_block(self.kv.as_ref(), len - 1).map(Some),
        }
    }

    /// Blocks in `range`, clamped to the chain.
    pub fn get_blocks(&self, range: Range<u64>) -> Result<Vec<Block>, BlockStoreError> {
        let chain = self.chain.read();
        let end = range.end.min(chain.len);
        if range.start >= end {
            return Ok(Vec::new());
        }
        load_range(self.kv.as_ref(), range.start, end)
    }

    /// Iterate the whole chain in batches of the configured size.
    pub fn batches(&self) -> BlockBatches<'_> {
        self.batches_of(self.config.effective_batch_size())
    }

    pub fn batches_of(&self, batch_size: usize) -> BlockBatches<'_> {
        let guard = self.chain.read();
        BlockBatches {
            store: self,
            len: guard.len,
            _guard: guard,
            next: 0,
            batch_size: batch_size.max(1) as u64,
        }
    }

    /// Every block, in order.
    pub fn all_blocks(&self) -> Result<Vec<Block>, BlockStoreError> {
        let mut blocks = Vec::new();
        for batch in self.batches() {
            blocks.extend(batch?);
        }
        Ok(blocks)
    }

    /// First block whose stored hash equals `hash`.
    pub fn get_block_by_hash(&self, hash: &Hash) -> Result<Option<Block>, BlockStoreError> {
        for batch in self.batches() {
            if let Some(block) = batch?.into_iter().find(|b| &b.hash == hash) {
                return Ok(Some(block));
            }
        }
        Ok(None)
    }

    /// Blocks matching `query`, in chain order.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Block>, BlockStoreError> {
        let limit = query.limit.unwrap_or(usize::MAX);
        let mut found = Vec::new();
        if limit == 0 {
            return Ok(found);
        }

        if let Some(block_number) = query.block_number {
            let chain = self.chain.read();
            if block_number < chain.len {
                let block = load_block(self.kv.as_ref(), block_number)?;
                if query.matches(&block) {
                    found.push(block);
                }
            }
            return Ok(found);
        }

        for batch in self.batches() {
            for block in batch? {
                if query.matches(&block) {
                    found.push(block);
                    if found.len() >= limit {
                        return Ok(found);
                    }
                }
            }
        }
        Ok(found)
    }

    /// Whether any block was signed by `public_key`.
    pub fn has_blocks_signed_by(&self, public_key: &str) -> Result<bool, BlockStoreError> {
        for batch in self.batches() {
            if batch?.iter().any(|b| b.signer_public_key == public_key) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// `(block_number, reference)` for every off-chain block.
    pub fn off_chain_references(&self) -> Result<Vec<(u64, OffChainReference)>, BlockStoreError> {
        let mut references = Vec::new();
        for batch in self.batches() {
            references.extend(batch?.into_iter().filter_map(|block| {
                let number = block.block_number;
                match block.payload {
                    crate::domain::block::BlockPayload::OffChain { reference } => {
                        Some((number, reference))
                    }
                    _ => None,
                }
            }));
        }
        Ok(references)
    }
}
