//! # Block Store Errors

use lc_01_key_registry::RegistryError;
use lc_02_offchain_storage::OffChainError;
use shared_crypto::CryptoError;
use shared_types::{ErrorKind, KVStoreError};
use thiserror::Error;

/// Errors raised by block store operations.
///
/// Every failed operation leaves the chain exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockStoreError {
    /// The signer is not authorized at the proposed timestamp.
    #[error("Signer is not authorized: {public_key}")]
    UnauthorizedSigner { public_key: String },

    /// Block data must not be empty.
    #[error("Block data must not be empty")]
    EmptyData,

    /// Payload exceeds the largest accepted size.
    #[error("Payload of {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },

    /// Block options failed validation.
    #[error("Invalid block options: {reason}")]
    InvalidOptions { reason: String },

    /// Recipient key could not be decoded.
    #[error("Invalid recipient key: {0}")]
    InvalidRecipient(CryptoError),

    /// Sealing an inline payload failed.
    #[error("Encryption failed: {0}")]
    Encryption(CryptoError),

    /// Rollback count or target out of range.
    #[error("Invalid rollback target: {reason}")]
    InvalidRollbackTarget { reason: String },

    #[error("Block #{block_number} not found")]
    BlockNotFound { block_number: u64 },

    /// A persisted block record could not be encoded or decoded.
    #[error("Block record serialization failed: {message}")]
    Serialization { message: String },

    #[error(transparent)]
    OffChain(#[from] OffChainError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Storage(#[from] KVStoreError),
}

impl BlockStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockStoreError::UnauthorizedSigner { .. } => ErrorKind::Authorization,
            BlockStoreError::EmptyData
            | BlockStoreError::PayloadTooLarge { .. }
            | BlockStoreError::InvalidOptions { .. }
            | BlockStoreError::InvalidRecipient(_)
            | BlockStoreError::InvalidRollbackTarget { .. } => ErrorKind::Validation,
            BlockStoreError::Encryption(_) => ErrorKind::Storage,
            BlockStoreError::BlockNotFound { .. } => ErrorKind::NotFound,
            BlockStoreError::Serialization { .. } => ErrorKind::Integrity,
            BlockStoreError::OffChain(e) => e.kind(),
            BlockStoreError::Registry(e) => e.kind(),
            BlockStoreError::Storage(e) => e.kind(),
        }
    }

    pub(crate) fn invalid_options(reason: impl Into<String>) -> Self {
        BlockStoreError::InvalidOptions {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_rollback(reason: impl Into<String>) -> Self {
        BlockStoreError::InvalidRollbackTarget {
            reason: reason.into(),
        }
    }
}
