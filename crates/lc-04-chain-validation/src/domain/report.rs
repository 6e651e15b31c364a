//! Validation outcomes.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{Hash, Timestamp};

/// Terminal state of one block after the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockStatus {
    Valid,
    /// Stored hash differs from the hash recomputed over the block's fields.
    HashMismatch,
    /// Wrong block number, or `previous_hash` does not match the predecessor.
    LinkBroken,
    SignatureInvalid,
    /// No registry entry covered the block timestamp.
    UnauthorizedAtSigning,
    /// Authorized when signed, revoked afterwards.
    RevokedSince { revoked_at: Timestamp },
}

impl BlockStatus {
    /// Hash, link and signature failures.
    pub fn is_structural_failure(&self) -> bool {
        matches!(
            self,
            Self::HashMismatch | Self::LinkBroken | Self::SignatureInvalid
        )
    }

    /// Counted in `invalid_blocks`.
    pub fn is_invalid(&self) -> bool {
        self.is_structural_failure() || matches!(self, Self::UnauthorizedAtSigning)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A block whose status is not `Valid`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFinding {
    pub block_number: u64,
    /// Hash as stored in the block.
    #[serde_as(as = "Hex")]
    pub stored_hash: Hash,
    pub signer_public_key: String,
    #[serde(flatten)]
    pub status: BlockStatus,
}

/// Aggregated outcome of a full-chain walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainValidationResult {
    /// No hash, link or signature failures.
    pub is_structurally_intact: bool,
    /// Structurally intact, no unauthorized signers and no revoked signers.
    pub is_fully_compliant: bool,
    pub total_blocks: u64,
    pub valid_blocks: u64,
    /// Hash, link, signature and unauthorized-at-signing failures.
    pub invalid_blocks: u64,
    /// Subset of `invalid_blocks` that are hash, link or signature failures.
    pub structural_failures: u64,
    pub unauthorized_blocks: u64,
    /// Blocks signed by keys revoked since. Not counted as invalid.
    pub revoked_blocks: u64,
    /// Every block that is not `Valid`, in chain order.
    pub findings: Vec<BlockFinding>,
    pub summary: String,
}

impl ChainValidationResult {
    pub(crate) fn from_counts(
        total_blocks: u64,
        structural_failures: u64,
        unauthorized_blocks: u64,
        revoked_blocks: u64,
        findings: Vec<BlockFinding>,
    ) -> Self {
        let invalid_blocks = structural_failures + unauthorized_blocks;
        let is_structurally_intact = structural_failures == 0;
        let is_fully_compliant =
            is_structurally_intact && unauthorized_blocks == 0 && revoked_blocks == 0;

        let summary = if is_fully_compliant {
            "Chain is fully valid".to_string()
        } else if is_structurally_intact {
            "Chain is structurally intact but has authorization issues".to_string()
        } else {
            format!(
                "Chain integrity compromised: {} of {} blocks failed hash, link or signature checks",
                structural_failures, total_blocks
            )
        };

        Self {
            is_structurally_intact,
            is_fully_compliant,
            total_blocks,
            valid_blocks: total_blocks - invalid_blocks - revoked_blocks,
            invalid_blocks,
            structural_failures,
            unauthorized_blocks,
            revoked_blocks,
            findings,
            summary,
        }
    }

    /// Result for a chain with no blocks.
    pub fn empty() -> Self {
        Self::from_counts(0, 0, 0, 0, Vec::new())
    }

    /// Status of `block_number`. Blocks without a finding are `Valid`.
    pub fn status_of(&self, block_number: u64) -> Option<BlockStatus> {
        if block_number >= self.total_blocks {
            return None;
        }
        Some(
            self.findings
                .iter()
                .find(|f| f.block_number == block_number)
                .map_or(BlockStatus::Valid, |f| f.status),
        )
    }
}
