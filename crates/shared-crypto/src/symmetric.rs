//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 AEAD underneath sealed envelopes. Callers pass the
//! envelope header as associated data so a ciphertext cannot be replayed
//! under a different header.

use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;

/// Derived content key. Wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(self.as_bytes().into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Random 192-bit nonce; collisions are negligible without a counter.
    pub fn random() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

/// Encrypt `plaintext` bound to `associated_data` under a fresh nonce.
///
/// Returns the ciphertext (with tag) and the nonce used.
pub fn encrypt(
    key: &SecretKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<(Vec<u8>, Nonce), CryptoError> {
    let nonce = Nonce::random()?;
    let payload = Payload {
        msg: plaintext,
        aad: associated_data,
    };
    let ciphertext = key
        .cipher()
        .encrypt(XNonce::from_slice(nonce.as_bytes()), payload)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    Ok((ciphertext, nonce))
}

/// # Errors
///
/// `CryptoError::DecryptionFailed` on a wrong key, nonce or associated data,
/// or any modification of the ciphertext.
pub fn decrypt(
    key: &SecretKey,
    ciphertext: &[u8],
    nonce: &Nonce,
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let payload = Payload {
        msg: ciphertext,
        aad: associated_data,
    };
    key.cipher()
        .decrypt(XNonce::from_slice(nonce.as_bytes()), payload)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
