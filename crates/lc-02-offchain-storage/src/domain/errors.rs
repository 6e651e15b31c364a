//! # Off-Chain Errors

use shared_crypto::CryptoError;
use shared_types::ErrorKind;
use thiserror::Error;

/// Failure inside a `BlobStore` adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobStoreError {
    #[error("Blob I/O error: {message}")]
    Io { message: String },
}

impl BlobStoreError {
    pub(crate) fn io(err: impl std::fmt::Display) -> Self {
        BlobStoreError::Io {
            message: err.to_string(),
        }
    }
}

/// Errors raised by the off-chain store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OffChainError {
    /// Blob persistence failed. Nothing was published.
    #[error("Off-chain storage error: {0}")]
    Storage(#[from] BlobStoreError),

    /// No blob with this id.
    #[error("Off-chain data not found: {blob_id}")]
    NotFound { blob_id: String },

    /// Decryption was required but the key is missing or wrong.
    #[error("Off-chain decryption failed: {message}")]
    Decryption { message: String },

    /// Stored bytes or decrypted content disagree with the reference.
    #[error("Off-chain integrity check failed: {message}")]
    Integrity { message: String },

    /// The recipient key could not be decoded.
    #[error("Invalid recipient key: {0}")]
    InvalidRecipient(CryptoError),

    /// Sealing the payload failed.
    #[error("Off-chain encryption failed: {0}")]
    Encryption(CryptoError),

    /// Payload exceeds the configured maximum.
    #[error("Off-chain payload of {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },
}

impl OffChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OffChainError::Storage(_) | OffChainError::Encryption(_) => ErrorKind::Storage,
            OffChainError::NotFound { .. } => ErrorKind::NotFound,
            OffChainError::Decryption { .. } => ErrorKind::Authorization,
            OffChainError::Integrity { .. } => ErrorKind::Integrity,
            OffChainError::InvalidRecipient(_) | OffChainError::PayloadTooLarge { .. } => {
                ErrorKind::Validation
            }
        }
    }
}
