//! # Registry Errors

use shared_crypto::CryptoError;
use shared_types::{ErrorKind, KVStoreError};
use thiserror::Error;

/// Errors raised by registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The supplied public key could not be decoded.
    #[error("Invalid public key: {0}")]
    InvalidKey(#[from] CryptoError),

    /// Owner names must be non-blank.
    #[error("Owner name must not be empty")]
    EmptyOwnerName,

    /// Revocations must carry a reason.
    #[error("Revocation reason must not be empty")]
    EmptyReason,

    /// The key already has an active entry.
    #[error("Key already registered and active: {public_key}")]
    DuplicateKey { public_key: String },

    /// No entry exists for the key.
    #[error("Key not found: {public_key}")]
    KeyNotFound { public_key: String },

    /// The admin key is not currently authorized or the signature does not verify.
    #[error("Unauthorized revocation: {reason}")]
    UnauthorizedRevocation { reason: String },

    /// A registry record could not be encoded or decoded.
    #[error("Registry record serialization failed: {message}")]
    Serialization { message: String },

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] KVStoreError),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::InvalidKey(_)
            | RegistryError::EmptyOwnerName
            | RegistryError::EmptyReason
            | RegistryError::DuplicateKey { .. } => ErrorKind::Validation,
            RegistryError::KeyNotFound { .. } => ErrorKind::NotFound,
            RegistryError::UnauthorizedRevocation { .. } => ErrorKind::Authorization,
            RegistryError::Serialization { .. } => ErrorKind::Integrity,
            RegistryError::Storage(e) => e.kind(),
        }
    }
}
