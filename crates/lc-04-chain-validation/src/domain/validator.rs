//! Streaming chain validator.
//!
//! Pure reducer: feed blocks in chain order with [`ChainValidator::observe`],
//! then call [`ChainValidator::finish`]. Holds only the predecessor's
//! recomputed hash and the findings, so memory does not grow with the number
//! of valid blocks.

use super::report::{BlockFinding, BlockStatus, ChainValidationResult};
use lc_01_key_registry::{AuthorizationView, SigningAuthorization};
use lc_03_block_storage::Block;
use shared_types::{short_hash, Hash, GENESIS_PREVIOUS_HASH};
use tracing::debug;

pub struct ChainValidator<'a> {
    authorization: &'a dyn AuthorizationView,
    expected_number: u64,
    predecessor_hash: Hash,
    structural_failures: u64,
    unauthorized_blocks: u64,
    revoked_blocks: u64,
    findings: Vec<BlockFinding>,
}

impl<'a> ChainValidator<'a> {
    /// `authorization` should be a snapshot taken for the whole walk.
    pub fn new(authorization: &'a dyn AuthorizationView) -> Self {
        Self {
            authorization,
            expected_number: 0,
            predecessor_hash: GENESIS_PREVIOUS_HASH,
            structural_failures: 0,
            unauthorized_blocks: 0,
            revoked_blocks: 0,
            findings: Vec::new(),
        }
    }

    /// Classify the next block and fold it into the running counts.
    pub fn observe(&mut self, block: &Block) -> BlockStatus {
        let recomputed = block.compute_hash();
        let status = self.classify(block, &recomputed);

        // Successors link against what the predecessor actually hashes to
        self.predecessor_hash = recomputed;
        self.expected_number += 1;

        match status {
            BlockStatus::Valid => return status,
            BlockStatus::UnauthorizedAtSigning => self.unauthorized_blocks += 1,
            BlockStatus::RevokedSince { .. } => self.revoked_blocks += 1,
            _ => self.structural_failures += 1,
        }
        debug!(
            "[lc-04] 🔎 Block #{} {}: {:?}",
            block.block_number,
            short_hash(&block.hash),
            status
        );
        self.findings.push(BlockFinding {
            block_number: block.block_number,
            stored_hash: block.hash,
            signer_public_key: block.signer_public_key.clone(),
            status,
        });
        status
    }

    fn classify(&self, block: &Block, recomputed: &Hash) -> BlockStatus {
        if &block.hash != recomputed {
            return BlockStatus::HashMismatch;
        }
        if block.block_number != self.expected_number
            || block.previous_hash != self.predecessor_hash
        {
            return BlockStatus::LinkBroken;
        }
        if !shared_crypto::verify(
            &block.signing_payload(),
            &block.signature,
            &block.signer_public_key,
        ) {
            return BlockStatus::SignatureInvalid;
        }
        match self
            .authorization
            .signing_authorization(&block.signer_public_key, block.timestamp)
        {
            SigningAuthorization::Active => BlockStatus::Valid,
            SigningAuthorization::RevokedSince { revoked_at } => {
                BlockStatus::RevokedSince { revoked_at }
            }
            SigningAuthorization::NotAuthorized => BlockStatus::UnauthorizedAtSigning,
        }
    }

    /// Blocks observed so far.
    pub fn observed(&self) -> u64 {
        self.expected_number
    }

    pub fn finish(self) -> ChainValidationResult {
        ChainValidationResult::from_counts(
            self.expected_number,
            self.structural_failures,
            self.unauthorized_blocks,
            self.revoked_blocks,
            self.findings,
        )
    }
}
