//! # Chain Validation (lc-04)
//!
//! Read-only walk over a block sequence that classifies every block and
//! reduces the findings into a [`ChainValidationResult`].
//!
//! ## Per-block checks
//!
//! Checks run in order and the first failure decides the block's status:
//!
//! | Step | Check | Failure |
//! |------|-------|---------|
//! | 1 | Recomputed hash equals stored hash | `HashMismatch` |
//! | 2 | Number is contiguous; `previous_hash` equals the predecessor's recomputed hash (genesis: zero sentinel) | `LinkBroken` |
//! | 3 | Signature verifies against `signer_public_key` | `SignatureInvalid` |
//! | 4 | Signer was authorized at the block timestamp | `UnauthorizedAtSigning` |
//! | 5 | Signer has not been revoked since | `RevokedSince` |
//!
//! Validation never aborts on a finding. Only a storage failure while
//! reading the chain is an error.

pub mod domain;
pub mod service;

pub use domain::report::{BlockFinding, BlockStatus, ChainValidationResult};
pub use domain::validator::ChainValidator;
pub use service::{validate_batches, validate_blocks, validate_chain};
