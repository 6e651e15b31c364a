//! # Outbound Ports
//!
//! Where blob bytes physically live.

use crate::domain::errors::BlobStoreError;
use shared_types::Hash;

/// Raw blob persistence keyed by blob id.
///
/// `write` must be all-or-nothing: a reader either sees the complete blob or
/// no blob at all.
pub trait BlobStore: Send + Sync {
    fn write(&self, id: &Hash, bytes: &[u8]) -> Result<(), BlobStoreError>;

    fn read(&self, id: &Hash) -> Result<Option<Vec<u8>>, BlobStoreError>;

    /// Returns `true` if a blob was removed.
    fn remove(&self, id: &Hash) -> Result<bool, BlobStoreError>;

    /// Every stored blob id.
    fn list(&self) -> Result<Vec<Hash>, BlobStoreError>;
}
