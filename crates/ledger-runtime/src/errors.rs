//! # Ledger Errors
//!
//! One error type for the facade. Subsystem errors are wrapped unchanged so
//! `kind()` still reports the subsystem's classification.

use crate::config::ConfigError;
use crate::lock::LockError;
use lc_01_key_registry::RegistryError;
use lc_02_offchain_storage::OffChainError;
use lc_03_block_storage::BlockStoreError;
use shared_types::{ErrorKind, KVStoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Blocks(#[from] BlockStoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    OffChain(#[from] OffChainError),

    #[error(transparent)]
    Storage(#[from] KVStoreError),

    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    #[error("Key {public_key} has signed {signed_blocks} block(s); use force to revoke it anyway")]
    KeyInUse {
        public_key: String,
        signed_blocks: u64,
    },

    #[error("Integrity check failed: {reason}")]
    Integrity { reason: String },

    #[error("Unsupported export format version {found} (supported: {supported})")]
    UnsupportedFormat { found: u32, supported: u32 },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(e) => e.kind(),
            Self::Lock(_) | Self::Storage(_) | Self::Io { .. } => ErrorKind::Storage,
            Self::Blocks(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::OffChain(e) => e.kind(),
            Self::Validation { .. }
            | Self::KeyInUse { .. }
            | Self::UnsupportedFormat { .. }
            | Self::Serialization { .. } => ErrorKind::Validation,
            Self::Integrity { .. } => ErrorKind::Integrity,
        }
    }

    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub(crate) fn integrity(reason: impl Into<String>) -> Self {
        Self::Integrity {
            reason: reason.into(),
        }
    }
}
