//! # Core Primitives
//!
//! Hash and time types used across the ledger.

/// SHA-256 digest (32 bytes).
pub type Hash = [u8; 32];

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Previous-hash value carried by the genesis block (block 0).
pub const GENESIS_PREVIOUS_HASH: Hash = [0u8; 32];

/// Render a hash as lowercase hex.
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a 64-character hex string into a hash.
///
/// Returns `None` for anything that is not exactly 32 bytes of hex.
pub fn hash_from_hex(value: &str) -> Option<Hash> {
    let bytes = hex::decode(value.trim()).ok()?;
    bytes.try_into().ok()
}

/// Short form of a hash for log lines (first 8 bytes).
pub fn short_hash(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}
