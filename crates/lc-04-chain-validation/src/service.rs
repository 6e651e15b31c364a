//! # Validation Entry Points
//!
//! `validate_chain` walks a live `BlockStore` under its read lock, so the
//! result describes one committed chain even while other threads append.
//! `validate_blocks` checks an in-memory sequence (an import document).

use crate::domain::report::ChainValidationResult;
use crate::domain::validator::ChainValidator;
use lc_01_key_registry::{AuthorizationView, KeyRegistry};
use lc_03_block_storage::{Block, BlockStore, BlockStoreError};
use tracing::{info, warn};

/// Validate the chain held by `store` against `registry`.
///
/// # Errors
///
/// Only a failure to read blocks. Findings are reported in the result.
pub fn validate_chain(
    store: &BlockStore,
    registry: &KeyRegistry,
) -> Result<ChainValidationResult, BlockStoreError> {
    // Chain lock first, then the registry snapshot
    let batches = store.batches();
    let snapshot = registry.snapshot();
    let result = validate_batches(batches, &snapshot)?;
    log_result(&result);
    Ok(result)
}

/// Reduce a batched block stream. Stops at the first batch error.
pub fn validate_batches<I, E>(
    batches: I,
    authorization: &dyn AuthorizationView,
) -> Result<ChainValidationResult, E>
where
    I: IntoIterator<Item = Result<Vec<Block>, E>>,
{
    let mut validator = ChainValidator::new(authorization);
    for batch in batches {
        for block in batch? {
            validator.observe(&block);
        }
    }
    Ok(validator.finish())
}

/// Validate blocks that are not (yet) in a store.
pub fn validate_blocks<'b, I>(blocks: I, authorization: &dyn AuthorizationView) -> ChainValidationResult
where
    I: IntoIterator<Item = &'b Block>,
{
    let mut validator = ChainValidator::new(authorization);
    for block in blocks {
        validator.observe(block);
    }
    validator.finish()
}

fn log_result(result: &ChainValidationResult) {
    if result.is_fully_compliant {
        info!(
            "[lc-04] ✅ Validated {} blocks: {}",
            result.total_blocks, result.summary
        );
    } else {
        warn!(
            "[lc-04] ⚠️ Validated {} blocks: {} (invalid: {}, revoked: {})",
            result.total_blocks, result.summary, result.invalid_blocks, result.revoked_blocks
        );
    }
}
