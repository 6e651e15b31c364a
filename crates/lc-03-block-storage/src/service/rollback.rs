//! Rollback and its dry run.

use super::helpers::{block_key, chain_len_ops, load_block, load_range, unpinned};
use super::{BlockStore, ChainState};
use crate::domain::errors::BlockStoreError;
use crate::domain::rollback::{plan, RollbackReport, RollbackRequest};
use shared_types::{short_hash, BatchOperation, Hash};
use std::collections::HashSet;
use tracing::{info, warn};

impl BlockStore {
    /// Remove the most recent `count` blocks.
    pub fn rollback(&self, count: u64) -> Result<RollbackReport, BlockStoreError> {
        self.execute_rollback(RollbackRequest::Count(count))
    }

    /// Remove every block after `target_block_number`.
    pub fn rollback_to_block(&self, target_block_number: u64) -> Result<RollbackReport, BlockStoreError> {
        self.execute_rollback(RollbackRequest::ToBlock(target_block_number))
    }

    /// What `rollback(count)` would report, without changing anything.
    pub fn preview_rollback(&self, count: u64) -> Result<RollbackReport, BlockStoreError> {
        plan(RollbackRequest::Count(count), self.chain.read().len)
    }

    /// What `rollback_to_block(target)` would report, without changing anything.
    pub fn preview_rollback_to_block(
        &self,
        target_block_number: u64,
    ) -> Result<RollbackReport, BlockStoreError> {
        plan(
            RollbackRequest::ToBlock(target_block_number),
            self.chain.read().len,
        )
    }

    fn execute_rollback(&self, request: RollbackRequest) -> Result<RollbackReport, BlockStoreError> {
        let mut chain = self.chain.write();
        let report = plan(request, chain.len)?;
        if report.removed_count == 0 {
            return Ok(report);
        }

        let kv = self.kv.as_ref();
        let removed = load_range(kv, report.final_count, report.previous_count)?;
        let mut orphaned: HashSet<Hash> = removed
            .iter()
            .filter_map(|b| b.off_chain_reference().map(|r| r.blob_id))
            .collect();
        if !orphaned.is_empty() {
            // Identical plaintext payloads share a blob; keep it if a survivor uses it
            let batch_size = self.config.effective_batch_size() as u64;
            let mut start = 0;
            while start < report.final_count && !orphaned.is_empty() {
                let end = (start + batch_size).min(report.final_count);
                for block in load_range(kv, start, end)? {
                    if let Some(reference) = block.off_chain_reference() {
                        orphaned.remove(&reference.blob_id);
                    }
                }
                start = end;
            }
        }
        let orphaned = unpinned(kv, orphaned)?;
        let new_tip = load_block(kv, report.final_count - 1)?;

        let mut operations: Vec<BatchOperation> = (report.final_count..report.previous_count)
            .map(|n| BatchOperation::delete(block_key(n)))
            .collect();
        operations.extend(chain_len_ops(report.final_count));
        self.kv.atomic_batch_write(operations)?;

        *chain = ChainState::from_tip(report.final_count, Some(&new_tip));

        // Still under the chain lock: an append must not reuse a blob mid-delete
        for blob_id in &orphaned {
            if let Err(e) = self.off_chain.delete(blob_id) {
                warn!(
                    "[lc-03] ⚠️ Rolled back but could not delete off-chain blob {}: {}",
                    short_hash(blob_id),
                    e
                );
            }
        }

        info!(
            "[lc-03] ⏪ Rolled back {} blocks ({} -> {}), {} off-chain blobs released",
            report.removed_count,
            report.previous_count,
            report.final_count,
            orphaned.len()
        );
        Ok(report)
    }
}
