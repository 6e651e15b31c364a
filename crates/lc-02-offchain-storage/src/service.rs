//! # Off-Chain Store Service

use crate::domain::entities::{BlobHealth, OffChainConfig, OffChainReference};
use crate::domain::errors::OffChainError;
use crate::ports::BlobStore;
use parking_lot::RwLock;
use shared_crypto::{sha256, SealedEnvelope, Secp256k1KeyPair};
use shared_types::{hash_to_hex, short_hash, Hash};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Content-addressed payload store.
pub struct OffChainStore {
    blobs: Arc<dyn BlobStore>,
    config: OffChainConfig,
    /// Known blob ids. Retrievals hold the read lock for their whole duration.
    index: RwLock<HashSet<Hash>>,
}

impl OffChainStore {
    /// Wrap `blobs`, indexing whatever it already holds.
    pub fn open(blobs: Arc<dyn BlobStore>, config: OffChainConfig) -> Result<Self, OffChainError> {
        let index: HashSet<Hash> = blobs.list()?.into_iter().collect();
        if !index.is_empty() {
            info!("[lc-02] 💾 Indexed {} existing off-chain blobs", index.len());
        }
        Ok(Self {
            blobs,
            config,
            index: RwLock::new(index),
        })
    }

    pub fn config(&self) -> &OffChainConfig {
        &self.config
    }

    /// Persist `payload`, sealed for `recipient` when one is given.
    ///
    /// # Errors
    ///
    /// - `PayloadTooLarge` above the configured maximum
    /// - `InvalidRecipient` if the recipient key does not decode
    /// - `Storage` if the blob could not be written; nothing is published then
    pub fn store(
        &self,
        payload: &[u8],
        recipient: Option<&str>,
    ) -> Result<OffChainReference, OffChainError> {
        let size_bytes = payload.len() as u64;
        if size_bytes > self.config.max_payload_bytes {
            return Err(OffChainError::PayloadTooLarge {
                size: size_bytes,
                max: self.config.max_payload_bytes,
            });
        }

        let content_hash = sha256(payload);
        let (stored, recipient) = match recipient {
            Some(encoded) => {
                let recipient_key = shared_crypto::decode_public_key(encoded)
                    .map_err(OffChainError::InvalidRecipient)?;
                let envelope = shared_crypto::seal(payload, &recipient_key)
                    .map_err(OffChainError::Encryption)?;
                (envelope.to_bytes(), Some(recipient_key.encode()))
            }
            None => (payload.to_vec(), None),
        };
        let blob_id = sha256(&stored);

        {
            let mut index = self.index.write();
            if !index.contains(&blob_id) {
                self.blobs.write(&blob_id, &stored)?;
                index.insert(blob_id);
            }
        }

        info!(
            "[lc-02] 📦 Stored off-chain blob {} ({} bytes, encrypted: {})",
            short_hash(&blob_id),
            size_bytes,
            recipient.is_some()
        );
        Ok(OffChainReference {
            blob_id,
            content_hash,
            size_bytes,
            encrypted: recipient.is_some(),
            recipient,
        })
    }

    /// Fetch and verify the payload behind `reference`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the blob is unknown
    /// - `Decryption` if the payload is encrypted and `key` is absent or wrong
    /// - `Integrity` if the stored bytes or the recovered plaintext do not hash
    ///   to the values in `reference`
    pub fn retrieve(
        &self,
        reference: &OffChainReference,
        key: Option<&Secp256k1KeyPair>,
    ) -> Result<Vec<u8>, OffChainError> {
        let index = self.index.read();
        let stored = self.read_verified(&index, &reference.blob_id)?;

        let payload = if reference.encrypted {
            let key = key.ok_or_else(|| OffChainError::Decryption {
                message: "payload is encrypted and no private key was supplied".into(),
            })?;
            let envelope = SealedEnvelope::from_bytes(&stored).map_err(|e| {
                OffChainError::Integrity {
                    message: e.to_string(),
                }
            })?;
            shared_crypto::open(&envelope, key).map_err(|e| OffChainError::Decryption {
                message: e.to_string(),
            })?
        } else {
            stored
        };
        drop(index);

        if sha256(&payload) != reference.content_hash {
            warn!(
                "[lc-02] ⚠️ Content hash mismatch for blob {}",
                short_hash(&reference.blob_id)
            );
            return Err(OffChainError::Integrity {
                message: format!(
                    "content hash mismatch for blob {}",
                    reference.blob_id_hex()
                ),
            });
        }
        Ok(payload)
    }

    /// Remove a blob. Returns `false` if it was already gone.
    ///
    /// Only block-store rollback and import call this, after the referencing
    /// blocks are gone.
    pub fn delete(&self, blob_id: &Hash) -> Result<bool, OffChainError> {
        let mut index = self.index.write();
        let removed = self.blobs.remove(blob_id)?;
        index.remove(blob_id);
        if removed {
            debug!("[lc-02] 🗑️ Deleted off-chain blob {}", short_hash(blob_id));
        }
        Ok(removed)
    }

    pub fn contains(&self, blob_id: &Hash) -> bool {
        self.index.read().contains(blob_id)
    }

    /// Stored bytes for `blob_id`, verified against the id.
    pub fn read_raw(&self, blob_id: &Hash) -> Result<Vec<u8>, OffChainError> {
        let index = self.index.read();
        self.read_verified(&index, blob_id)
    }

    /// Publish bytes that arrived from elsewhere (chain import).
    ///
    /// Returns the blob id, which is the SHA-256 of `bytes`.
    pub fn insert_raw(&self, bytes: &[u8]) -> Result<Hash, OffChainError> {
        let blob_id = sha256(bytes);
        let mut index = self.index.write();
        if !index.contains(&blob_id) {
            self.blobs.write(&blob_id, bytes)?;
            index.insert(blob_id);
        }
        Ok(blob_id)
    }

    /// Check a reference without decrypting.
    ///
    /// Unencrypted payloads are also checked against `content_hash` and
    /// `size_bytes`.
    pub fn audit(&self, reference: &OffChainReference) -> Result<BlobHealth, OffChainError> {
        let index = self.index.read();
        let Some(stored) = self.blobs.read(&reference.blob_id)? else {
            return Ok(BlobHealth::Missing);
        };
        drop(index);

        if sha256(&stored) != reference.blob_id {
            return Ok(BlobHealth::Corrupted);
        }
        if !reference.encrypted
            && (sha256(&stored) != reference.content_hash
                || stored.len() as u64 != reference.size_bytes)
        {
            return Ok(BlobHealth::Corrupted);
        }
        Ok(BlobHealth::Healthy)
    }

    /// Number of indexed blobs.
    pub fn blob_count(&self) -> usize {
        self.index.read().len()
    }

    fn read_verified(&self, index: &HashSet<Hash>, blob_id: &Hash) -> Result<Vec<u8>, OffChainError> {
        let not_found = || OffChainError::NotFound {
            blob_id: hash_to_hex(blob_id),
        };
        if !index.contains(blob_id) {
            return Err(not_found());
        }
        let stored = self.blobs.read(blob_id)?.ok_or_else(not_found)?;
        if sha256(&stored) != *blob_id {
            warn!(
                "[lc-02] ⚠️ Stored bytes of blob {} no longer match its id",
                short_hash(blob_id)
            );
            return Err(OffChainError::Integrity {
                message: format!("stored bytes do not match blob id {}", hash_to_hex(blob_id)),
            });
        }
        Ok(stored)
    }
}
