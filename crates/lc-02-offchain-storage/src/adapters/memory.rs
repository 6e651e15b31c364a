use crate::domain::errors::BlobStoreError;
use crate::ports::BlobStore;
use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashMap;

/// In-memory blob store for tests and ephemeral ledgers.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn write(&self, id: &Hash, bytes: &[u8]) -> Result<(), BlobStoreError> {
        self.blobs.write().insert(*id, bytes.to_vec());
        Ok(())
    }

    fn read(&self, id: &Hash) -> Result<Option<Vec<u8>>, BlobStoreError> {
        Ok(self.blobs.read().get(id).cloned())
    }

    fn remove(&self, id: &Hash) -> Result<bool, BlobStoreError> {
        Ok(self.blobs.write().remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<Hash>, BlobStoreError> {
        Ok(self.blobs.read().keys().copied().collect())
    }
}
