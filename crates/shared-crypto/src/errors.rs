//! Crypto error types.

use shared_types::ErrorKind;
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Key generation failed (entropy source unavailable)
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encoded key could not be decoded
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong key or tampered ciphertext)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Sealed envelope bytes are malformed
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),
}

impl CryptoError {
    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::KeyGenerationFailed(_) => ErrorKind::Storage,
            CryptoError::InvalidKeyFormat(_) => ErrorKind::Validation,
            CryptoError::EncryptionFailed(_) => ErrorKind::Storage,
            CryptoError::DecryptionFailed(_) => ErrorKind::Authorization,
            CryptoError::InvalidEnvelope(_) => ErrorKind::Integrity,
        }
    }
}
