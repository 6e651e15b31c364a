//! # ECDSA Signatures (secp256k1)
//!
//! Signing keys for block signers and registry administrators.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization
//! - Verification never panics and never errors: malformed input is `false`

use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secp256k1PublicKey([u8; 33]);

impl Secp256k1PublicKey {
    /// Create from SEC1 bytes (compressed or uncompressed).
    ///
    /// The key is normalized to its compressed form.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| CryptoError::InvalidKeyFormat("not a secp256k1 point".into()))?;
        Ok(Self::from_verifying_key(&verifying_key))
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Standard base64 of the compressed point.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse the base64 form produced by [`encode`](Self::encode).
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let trimmed = encoded.trim();
        if trimmed.is_empty() {
            return Err(CryptoError::InvalidKeyFormat("empty public key".into()));
        }
        let bytes = STANDARD
            .decode(trimmed)
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("bad base64: {e}")))?;
        Self::from_sec1_bytes(&bytes)
    }

    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_sec1_bytes(&self.0)
            .map_err(|_| CryptoError::InvalidKeyFormat("not a secp256k1 point".into()))
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(verifying_key) = self.verifying_key() else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PublicKey({})", self.encode())
    }
}

impl fmt::Display for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// ECDSA signature (64 bytes, r||s format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; 64]);

impl Secp256k1Signature {
    /// Create from bytes (64 bytes).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Owned copy of the raw bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

/// secp256k1 ECDSA keypair.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate a random keypair from the operating system entropy source.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyGenerationFailed` if the entropy source fails.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        // A uniformly random 32-byte string is a valid scalar with overwhelming
        // probability; the loop only repeats for zero or values >= n.
        loop {
            OsRng
                .try_fill_bytes(&mut bytes[..])
                .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
            if let Ok(signing_key) = SigningKey::from_slice(&bytes[..]) {
                return Ok(Self { signing_key });
            }
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| CryptoError::InvalidKeyFormat("invalid secp256k1 scalar".into()))?;
        Ok(Self { signing_key })
    }

    /// Parse a base64-encoded private key.
    pub fn from_encoded(encoded: &str) -> Result<Self, CryptoError> {
        let mut bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("bad base64: {e}")))?;
        let result = Self::from_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a message (deterministic RFC 6979).
    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        let sig: Signature = self.signing_key.sign(message);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&sig.to_bytes());
        Secp256k1Signature(bytes)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        bytes.copy_from_slice(&self.signing_key.to_bytes());
        bytes
    }

    /// Base64 form of the secret scalar.
    pub fn encode_private(&self) -> Zeroizing<String> {
        Zeroizing::new(STANDARD.encode(&self.to_bytes()[..]))
    }
}

impl fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// PROVIDER FUNCTIONS
// =============================================================================

/// Produce a fresh signing key pair.
pub fn generate_key_pair() -> Result<Secp256k1KeyPair, CryptoError> {
    Secp256k1KeyPair::generate()
}

/// Sign `payload` and return the raw 64-byte signature.
pub fn sign(payload: &[u8], key_pair: &Secp256k1KeyPair) -> Vec<u8> {
    key_pair.sign(payload).to_vec()
}

/// Verify `signature` over `payload` against an encoded public key.
///
/// Malformed keys and malformed signatures yield `false`.
pub fn verify(payload: &[u8], signature: &[u8], encoded_public_key: &str) -> bool {
    match Secp256k1PublicKey::decode(encoded_public_key) {
        Ok(public_key) => public_key.verify(payload, signature),
        Err(_) => false,
    }
}

/// Encode a public key to its canonical string form.
pub fn encode_public_key(public_key: &Secp256k1PublicKey) -> String {
    public_key.encode()
}

/// Decode a public key from its canonical string form.
pub fn decode_public_key(encoded: &str) -> Result<Secp256k1PublicKey, CryptoError> {
    Secp256k1PublicKey::decode(encoded)
}
