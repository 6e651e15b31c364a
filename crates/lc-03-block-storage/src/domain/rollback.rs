//! # Rollback Planning
//!
//! Pure range arithmetic shared by the real rollback and its dry run. The
//! genesis block is never removed.

use crate::domain::errors::BlockStoreError;
use serde::{Deserialize, Serialize};

/// Outcome of a rollback (or of its preview).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReport {
    pub previous_count: u64,
    pub removed_count: u64,
    pub final_count: u64,
}

/// Which blocks a rollback would remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackRequest {
    /// Remove the most recent `n` blocks.
    Count(u64),
    /// Keep blocks `0..=n`, remove everything after.
    ToBlock(u64),
}

/// Validate `request` against a chain of `length` blocks.
///
/// # Errors
///
/// `InvalidRollbackTarget` when the count is zero, would remove the genesis
/// block, or the target is not an existing block.
pub fn plan(request: RollbackRequest, length: u64) -> Result<RollbackReport, BlockStoreError> {
    let final_count = match request {
        RollbackRequest::Count(0) => {
            return Err(BlockStoreError::invalid_rollback(
                "rollback count must be at least 1",
            ))
        }
        RollbackRequest::Count(count) if count >= length => {
            return Err(BlockStoreError::invalid_rollback(format!(
                "cannot remove {count} blocks from a chain of {length}; the genesis block is kept"
            )))
        }
        RollbackRequest::Count(count) => length - count,
        RollbackRequest::ToBlock(target) if target >= length => {
            return Err(BlockStoreError::invalid_rollback(format!(
                "target block #{target} does not exist (chain length {length})"
            )))
        }
        RollbackRequest::ToBlock(target) => target + 1,
    };

    Ok(RollbackReport {
        previous_count: length,
        removed_count: length - final_count,
        final_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_within_range() {
        assert_eq!(
            plan(RollbackRequest::Count(2), 5).unwrap(),
            RollbackReport {
                previous_count: 5,
                removed_count: 2,
                final_count: 3
            }
        );
    }

    #[test]
    fn test_count_bounds() {
        assert!(plan(RollbackRequest::Count(0), 5).is_err());
        assert!(plan(RollbackRequest::Count(5), 5).is_err());
        assert!(plan(RollbackRequest::Count(6), 5).is_err());
        assert!(plan(RollbackRequest::Count(1), 0).is_err());
    }

    #[test]
    fn test_target_keeps_target_block() {
        let report = plan(RollbackRequest::ToBlock(0), 4).unwrap();
        assert_eq!(report.final_count, 1);
        assert_eq!(report.removed_count, 3);

        let report = plan(RollbackRequest::ToBlock(3), 4).unwrap();
        assert_eq!(report.removed_count, 0);

        assert!(plan(RollbackRequest::ToBlock(4), 4).is_err());
    }
}
