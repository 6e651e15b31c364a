//! # Sealed Envelopes
//!
//! Encrypt a payload so that only the holder of one secp256k1 private key can
//! read it.
//!
//! ## Construction
//!
//! 1. Fresh ephemeral keypair per envelope
//! 2. ECDH(ephemeral, recipient) shared x-coordinate
//! 3. BLAKE3 key derivation over shared || ephemeral_pk || recipient_pk
//! 4. XChaCha20-Poly1305 under the derived key and a random nonce, with the
//!    ephemeral public key as associated data
//!
//! ## Wire Layout
//!
//! `[ephemeral_pk: 33][nonce: 24][ciphertext+tag: rest]`

use crate::ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
use crate::hashing::blake3_derive_key;
use crate::symmetric::{self, Nonce, SecretKey, NONCE_LEN};
use crate::CryptoError;
use k256::ecdh::diffie_hellman;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use zeroize::Zeroizing;

const KDF_CONTEXT: &str = "ledger-chain envelope v1";

const EPHEMERAL_KEY_LEN: usize = 33;
/// Poly1305 authentication tag.
const TAG_LEN: usize = 16;

/// Ciphertext addressed to a single recipient key.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    /// Compressed ephemeral public key used for the key agreement.
    #[serde_as(as = "Base64")]
    pub ephemeral_public_key: [u8; EPHEMERAL_KEY_LEN],
    /// XChaCha20 nonce.
    #[serde_as(as = "Base64")]
    pub nonce: [u8; NONCE_LEN],
    /// AEAD ciphertext including the authentication tag.
    #[serde_as(as = "Base64")]
    pub ciphertext: Vec<u8>,
}

impl SealedEnvelope {
    /// Flatten into the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EPHEMERAL_KEY_LEN + NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.ephemeral_public_key);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the wire layout.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidEnvelope` if the input is too short to
    /// hold a header and an authentication tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let header = EPHEMERAL_KEY_LEN + NONCE_LEN;
        if bytes.len() < header + TAG_LEN {
            return Err(CryptoError::InvalidEnvelope(format!(
                "{} bytes is shorter than the minimum {}",
                bytes.len(),
                header + TAG_LEN
            )));
        }

        let mut ephemeral_public_key = [0u8; EPHEMERAL_KEY_LEN];
        ephemeral_public_key.copy_from_slice(&bytes[..EPHEMERAL_KEY_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[EPHEMERAL_KEY_LEN..header]);

        Ok(Self {
            ephemeral_public_key,
            nonce,
            ciphertext: bytes[header..].to_vec(),
        })
    }

    /// Total size in the wire layout.
    pub fn encoded_len(&self) -> usize {
        EPHEMERAL_KEY_LEN + NONCE_LEN + self.ciphertext.len()
    }
}

fn derive_key(
    shared_secret: &[u8],
    ephemeral: &Secp256k1PublicKey,
    recipient: &Secp256k1PublicKey,
) -> SecretKey {
    let mut material = Zeroizing::new(Vec::with_capacity(32 + 33 + 33));
    material.extend_from_slice(shared_secret);
    material.extend_from_slice(ephemeral.as_bytes());
    material.extend_from_slice(recipient.as_bytes());
    SecretKey::from_bytes(blake3_derive_key(KDF_CONTEXT, &material))
}

/// Encrypt `plaintext` for `recipient`.
///
/// # Errors
///
/// Returns `CryptoError::KeyGenerationFailed` if no ephemeral key could be
/// produced, or `CryptoError::EncryptionFailed` if the AEAD step fails.
pub fn seal(plaintext: &[u8], recipient: &Secp256k1PublicKey) -> Result<SealedEnvelope, CryptoError> {
    let ephemeral = Secp256k1KeyPair::generate()?;
    let ephemeral_public = ephemeral.public_key();
    let recipient_point = recipient.verifying_key()?;

    let shared = diffie_hellman(
        ephemeral.signing_key().as_nonzero_scalar(),
        recipient_point.as_affine(),
    );
    let key = derive_key(shared.raw_secret_bytes(), &ephemeral_public, recipient);
    let (ciphertext, nonce) = symmetric::encrypt(&key, plaintext, ephemeral_public.as_bytes())?;

    Ok(SealedEnvelope {
        ephemeral_public_key: *ephemeral_public.as_bytes(),
        nonce: *nonce.as_bytes(),
        ciphertext,
    })
}

/// Decrypt an envelope with the recipient's private key.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` when the key is not the intended
/// recipient or the envelope was modified.
pub fn open(envelope: &SealedEnvelope, recipient: &Secp256k1KeyPair) -> Result<Vec<u8>, CryptoError> {
    let ephemeral_public = Secp256k1PublicKey::from_sec1_bytes(&envelope.ephemeral_public_key)
        .map_err(|_| CryptoError::InvalidEnvelope("ephemeral key is not a curve point".into()))?;
    let ephemeral_point = ephemeral_public.verifying_key()?;

    let shared = diffie_hellman(
        recipient.signing_key().as_nonzero_scalar(),
        ephemeral_point.as_affine(),
    );
    let key = derive_key(
        shared.raw_secret_bytes(),
        &ephemeral_public,
        &recipient.public_key(),
    );

    symmetric::decrypt(
        &key,
        &envelope.ciphertext,
        &Nonce::from_bytes(envelope.nonce),
        &envelope.ephemeral_public_key,
    )
}
