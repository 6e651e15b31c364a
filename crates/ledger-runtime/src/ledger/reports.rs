//! Status, off-chain statistics and the off-chain audit.

use super::Ledger;
use crate::errors::LedgerError;
use lc_02_offchain_storage::BlobHealth;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{Hash, Timestamp};
use tracing::warn;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipSummary {
    pub block_number: u64,
    #[serde_as(as = "Hex")]
    pub hash: Hash,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatus {
    pub block_count: u64,
    pub total_keys: u64,
    pub active_keys: u64,
    pub last_block: Option<TipSummary>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffChainStatistics {
    pub off_chain_blocks: u64,
    pub encrypted_blocks: u64,
    /// Sum of plaintext sizes.
    pub total_bytes: u64,
    /// Zero when there are no off-chain blocks.
    pub average_bytes: u64,
}

/// Per-block result of checking every off-chain reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffChainAudit {
    pub checked: u64,
    pub healthy: u64,
    /// Block numbers whose blob is gone.
    pub missing: Vec<u64>,
    /// Block numbers whose blob no longer matches its reference.
    pub corrupted: Vec<u64>,
}

impl OffChainAudit {
    pub fn is_healthy(&self) -> bool {
        self.missing.is_empty() && self.corrupted.is_empty()
    }
}

impl Ledger {
    pub fn status(&self) -> Result<LedgerStatus, LedgerError> {
        let last_block = self.blocks.last_block()?.map(|block| TipSummary {
            block_number: block.block_number,
            hash: block.hash,
            timestamp: block.timestamp,
        });
        let counts = self.registry.counts();
        Ok(LedgerStatus {
            block_count: last_block.as_ref().map_or(0, |tip| tip.block_number + 1),
            total_keys: counts.total as u64,
            active_keys: counts.active as u64,
            last_block,
        })
    }

    pub fn off_chain_statistics(&self) -> Result<OffChainStatistics, LedgerError> {
        let mut stats = OffChainStatistics::default();
        for (_, reference) in self.blocks.off_chain_references()? {
            stats.off_chain_blocks += 1;
            stats.total_bytes += reference.size_bytes;
            if reference.encrypted {
                stats.encrypted_blocks += 1;
            }
        }
        if stats.off_chain_blocks > 0 {
            stats.average_bytes = stats.total_bytes / stats.off_chain_blocks;
        }
        Ok(stats)
    }

    /// Check every off-chain reference against the blob store without
    /// decrypting anything.
    pub fn verify_off_chain_data(&self) -> Result<OffChainAudit, LedgerError> {
        let mut audit = OffChainAudit::default();
        for (block_number, reference) in self.blocks.off_chain_references()? {
            audit.checked += 1;
            match self.off_chain.audit(&reference)? {
                BlobHealth::Healthy => audit.healthy += 1,
                BlobHealth::Missing => audit.missing.push(block_number),
                BlobHealth::Corrupted => audit.corrupted.push(block_number),
            }
        }
        if !audit.is_healthy() {
            warn!(
                "[ledger] ⚠️ Off-chain audit: {} missing, {} corrupted of {} checked",
                audit.missing.len(),
                audit.corrupted.len(),
                audit.checked
            );
        }
        Ok(audit)
    }
}
