//! # Block Store Service
//!
//! Owns the ordered block sequence.
//!
//! ## Locking
//!
//! One `RwLock<ChainState>` per chain. Appends, rollbacks and imports hold the
//! write lock from the moment they read the tip until their batch is durable,
//! so concurrent appends serialize and each sees the previous commit. Readers
//! (queries, batch iteration, validation) hold the read lock and therefore see
//! a stable chain.
//!
//! Lock order is chain first, registry second. The registry never calls back
//! into the block store.

mod helpers;
mod import;
mod query;
mod rollback;

pub use helpers::{BLOCK_KEY_PREFIX, PINNED_BLOB_PREFIX};
pub use query::BlockBatches;

use crate::domain::block::{signing_payload, Block, BlockPayload};
use crate::domain::config::BlockStoreConfig;
use crate::domain::errors::BlockStoreError;
use crate::domain::options::BlockOptions;
use helpers::{block_key, chain_len_ops, encode_block, load_block, pin_key, read_chain_len};
use lc_01_key_registry::{AuthorizationView, KeyRegistry, SigningAuthorization};
use lc_02_offchain_storage::{OffChainReference, OffChainStore};
use parking_lot::RwLock;
use shared_crypto::{sha256, Secp256k1KeyPair};
use shared_types::{
    short_hash, BatchOperation, Hash, KeyValueStore, TimeSource, Timestamp, GENESIS_PREVIOUS_HASH,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Committed chain position.
#[derive(Clone, Debug, Default)]
pub(crate) struct ChainState {
    pub len: u64,
    /// Hash and timestamp of the last block.
    pub tip: Option<(Hash, Timestamp)>,
}

impl ChainState {
    fn from_tip(len: u64, tip: Option<&Block>) -> Self {
        Self {
            len,
            tip: tip.map(|b| (b.hash, b.timestamp)),
        }
    }
}

/// Collaborators injected into the block store.
pub struct BlockStoreDependencies {
    pub kv_store: Arc<dyn KeyValueStore>,
    pub registry: Arc<KeyRegistry>,
    pub off_chain: Arc<OffChainStore>,
    pub time_source: Arc<dyn TimeSource>,
}

/// The append-only block store.
pub struct BlockStore {
    pub(crate) kv: Arc<dyn KeyValueStore>,
    pub(crate) registry: Arc<KeyRegistry>,
    pub(crate) off_chain: Arc<OffChainStore>,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) config: BlockStoreConfig,
    pub(crate) chain: RwLock<ChainState>,
}

impl BlockStore {
    /// Open the chain persisted in `deps.kv_store`.
    pub fn open(deps: BlockStoreDependencies, config: BlockStoreConfig) -> Result<Self, BlockStoreError> {
        let len = read_chain_len(deps.kv_store.as_ref())?;
        let tip = match len {
            0 => None,
            n => Some(load_block(deps.kv_store.as_ref(), n - 1)?),
        };

        match &tip {
            Some(block) => info!(
                "[lc-03] 📦 Loaded chain of {} blocks (tip #{} {})",
                len,
                block.block_number,
                short_hash(&block.hash)
            ),
            None => info!("[lc-03] No existing blocks found in storage"),
        }

        Ok(Self {
            kv: deps.kv_store,
            registry: deps.registry,
            off_chain: deps.off_chain,
            time_source: deps.time_source,
            config,
            chain: RwLock::new(ChainState::from_tip(len, tip.as_ref())),
        })
    }

    pub fn config(&self) -> &BlockStoreConfig {
        &self.config
    }

    /// Append one signed block.
    ///
    /// The block gets the next number, links to the current tip and carries a
    /// timestamp of `max(now, tip.timestamp)`. Payloads above the off-chain
    /// threshold (or with `options.off_chain`) are stored off-chain; payloads
    /// with a recipient are sealed for it.
    ///
    /// # Errors
    ///
    /// - `EmptyData`, `PayloadTooLarge`, `InvalidOptions`, `InvalidRecipient`
    /// - `UnauthorizedSigner` unless the signer holds an active entry covering
    ///   the timestamp
    /// - `OffChain` if the payload could not be stored
    /// - `Storage` if the block record could not be written
    ///
    /// On any error the chain and the off-chain store are unchanged.
    pub fn add_block(
        &self,
        data: &[u8],
        signer: &Secp256k1KeyPair,
        options: &BlockOptions,
    ) -> Result<Block, BlockStoreError> {
        if data.is_empty() {
            return Err(BlockStoreError::EmptyData);
        }
        let size = data.len() as u64;
        if size > self.config.max_off_chain_bytes {
            return Err(BlockStoreError::PayloadTooLarge {
                size,
                max: self.config.max_off_chain_bytes,
            });
        }
        let options = options.validate(&self.config)?;
        let signer_public_key = signer.public_key().encode();

        let mut chain = self.chain.write();

        let now = self.time_source.now();
        let timestamp = chain.tip.map_or(now, |(_, tip_ts)| now.max(tip_ts));
        // A revoked entry can still cover `timestamp` when its window was
        // closed past the tip, so only a live entry may sign.
        let authorization = self
            .registry
            .signing_authorization(&signer_public_key, timestamp);
        if authorization != SigningAuthorization::Active {
            warn!(
                "[lc-03] ⛔ Rejected block #{}: signer not authorized at {}",
                chain.len, timestamp
            );
            return Err(BlockStoreError::UnauthorizedSigner {
                public_key: signer_public_key,
            });
        }

        let recipient = options.recipient.as_ref().map(|pk| pk.encode());
        let mut published_blob = None;
        let payload = if options.off_chain || size > self.config.off_chain_threshold_bytes {
            let already_stored = recipient.is_none() && self.off_chain.contains(&sha256(data));
            let reference = self.off_chain.store(data, recipient.as_deref())?;
            if !already_stored {
                published_blob = Some(reference.blob_id);
            }
            BlockPayload::OffChain { reference }
        } else if let Some(recipient_key) = &options.recipient {
            let envelope =
                shared_crypto::seal(data, recipient_key).map_err(BlockStoreError::Encryption)?;
            BlockPayload::Sealed { envelope }
        } else {
            BlockPayload::inline(data)
        };

        let block_number = chain.len;
        let previous_hash = chain.tip.map_or(GENESIS_PREVIOUS_HASH, |(hash, _)| hash);
        let canonical = signing_payload(
            block_number,
            &previous_hash,
            timestamp,
            &payload,
            &signer_public_key,
        );
        let block = Block {
            block_number,
            previous_hash,
            hash: sha256(&canonical),
            timestamp,
            payload,
            signature: shared_crypto::sign(&canonical, signer),
            signer_public_key,
            custom_metadata: options.metadata,
            category: options.category,
            keywords: options.keywords,
            recipient,
        };

        let commit = encode_block(&block).and_then(|record| {
            let mut operations = vec![BatchOperation::put(block_key(block_number), record)];
            operations.extend(chain_len_ops(block_number + 1));
            self.kv.atomic_batch_write(operations).map_err(Into::into)
        });
        if let Err(e) = commit {
            if let Some(blob_id) = published_blob {
                if let Err(cleanup) = self.off_chain.delete(&blob_id) {
                    warn!(
                        "[lc-03] ⚠️ Failed to remove orphaned off-chain blob {}: {}",
                        short_hash(&blob_id),
                        cleanup
                    );
                }
            }
            return Err(e);
        }

        *chain = ChainState::from_tip(block_number + 1, Some(&block));
        info!(
            "[lc-03] 📦 Appended block #{} {} ({} bytes{})",
            block.block_number,
            short_hash(&block.hash),
            size,
            if block.off_chain_reference().is_some() {
                ", off-chain"
            } else {
                ""
            }
        );
        Ok(block)
    }

    /// Store a payload off-chain without a block.
    ///
    /// The blob is pinned, so rolling back or replacing a block that happens
    /// to share it (same plaintext) leaves it in place.
    ///
    /// # Errors
    ///
    /// `OffChain` if the payload could not be stored, `Storage` if the pin
    /// could not be written. Either way no new blob remains.
    pub fn store_off_chain(
        &self,
        data: &[u8],
        recipient: Option<&str>,
    ) -> Result<OffChainReference, BlockStoreError> {
        // Rollback decides which blobs to release under the write lock
        let _chain = self.chain.read();

        let already_stored = recipient.is_none() && self.off_chain.contains(&sha256(data));
        let reference = self.off_chain.store(data, recipient)?;
        if let Err(e) = self.kv.put(&pin_key(&reference.blob_id), &[]) {
            if !already_stored {
                if let Err(cleanup) = self.off_chain.delete(&reference.blob_id) {
                    warn!(
                        "[lc-03] ⚠️ Failed to remove unpinned off-chain blob {}: {}",
                        short_hash(&reference.blob_id),
                        cleanup
                    );
                }
            }
            return Err(e.into());
        }

        debug!(
            "[lc-03] 📌 Pinned standalone off-chain blob {}",
            short_hash(&reference.blob_id)
        );
        Ok(reference)
    }

}
