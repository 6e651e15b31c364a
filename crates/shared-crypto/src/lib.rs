//! # Shared Crypto - Ledger Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Block signing, admin revocation signatures |
//! | `hashing` | SHA-256, BLAKE3 | Block hashes, content hashes, key derivation |
//! | `symmetric` | XChaCha20-Poly1305 | Payload encryption |
//! | `envelope` | ECDH + XChaCha20-Poly1305 | Recipient-targeted encryption |
//!
//! ## Key Encoding
//!
//! Public keys travel as standard base64 of the 33-byte SEC1 compressed point.
//! Private keys travel as standard base64 of the 32-byte scalar.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod envelope;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use ecdsa::{
    decode_public_key, encode_public_key, generate_key_pair, sign, verify, Secp256k1KeyPair,
    Secp256k1PublicKey, Secp256k1Signature,
};
pub use envelope::{open, seal, SealedEnvelope};
pub use errors::CryptoError;
pub use hashing::{blake3_derive_key, sha256, Sha256Hasher};
pub use symmetric::{decrypt, encrypt, Nonce, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
