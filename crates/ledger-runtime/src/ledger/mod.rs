//! # Ledger Facade
//!
//! Wires the key registry, the off-chain store and the block store over one
//! shared key-value store, and exposes the operations callers (a CLI, tests)
//! invoke.
//!
//! ## Initialization Order
//!
//! ```text
//! KeyValueStore, BlobStore, TimeSource   (adapters)
//!   -> KeyRegistry                        (lc-01)
//!   -> OffChainStore                      (lc-02)
//!   -> BlockStore                         (lc-03, depends on lc-01 and lc-02)
//! ChainValidator                          (lc-04, stateless, per call)
//! ```
//!
//! ## Locking
//!
//! Lock order is chain, then registry, then the off-chain index. Operations
//! that span components take them in that order.

mod reports;
mod transfer;

pub use reports::{LedgerStatus, OffChainAudit, OffChainStatistics, TipSummary};

use crate::config::{LedgerConfig, DATABASE_FILE, OFF_CHAIN_DIR};
use crate::errors::LedgerError;
use crate::lock::DatabaseLock;
use lc_01_key_registry::{AuthorizedKey, KeyRegistry, RegistryError, RevocationTarget};
use lc_02_offchain_storage::{
    BlobStore, FileBlobStore, InMemoryBlobStore, OffChainError, OffChainReference, OffChainStore,
};
use lc_03_block_storage::{
    Block, BlockOptions, BlockPayload, BlockStore, BlockStoreDependencies, RollbackReport,
    SearchQuery,
};
use lc_04_chain_validation::{validate_chain, ChainValidationResult};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    FileBackedKVStore, Hash, InMemoryKVStore, KeyValueStore, SystemTimeSource, TimeSource,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Storage and clock adapters a ledger is built from.
pub struct LedgerComponents {
    pub kv_store: Arc<dyn KeyValueStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub time_source: Arc<dyn TimeSource>,
}

impl LedgerComponents {
    /// Volatile storage and the system clock.
    pub fn in_memory() -> Self {
        Self {
            kv_store: Arc::new(InMemoryKVStore::new()),
            blob_store: Arc::new(InMemoryBlobStore::new()),
            time_source: Arc::new(SystemTimeSource),
        }
    }

    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }
}

pub struct Ledger {
    config: LedgerConfig,
    registry: Arc<KeyRegistry>,
    off_chain: Arc<OffChainStore>,
    blocks: BlockStore,
    time_source: Arc<dyn TimeSource>,
    _lock: Option<DatabaseLock>,
}

impl Ledger {
    /// Build a ledger over the given adapters, loading any state they hold.
    pub fn with_components(
        components: LedgerComponents,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let LedgerComponents {
            kv_store,
            blob_store,
            time_source,
        } = components;

        let registry = Arc::new(KeyRegistry::open(kv_store.clone(), time_source.clone())?);
        let off_chain = Arc::new(OffChainStore::open(blob_store, config.off_chain())?);
        let blocks = BlockStore::open(
            BlockStoreDependencies {
                kv_store,
                registry: registry.clone(),
                off_chain: off_chain.clone(),
                time_source: time_source.clone(),
            },
            config.block_store.clone(),
        )?;

        info!(
            "[ledger] 🚀 Ledger ready: {} blocks, {} authorized keys",
            blocks.block_count(),
            registry.counts().active
        );
        Ok(Self {
            config,
            registry,
            off_chain,
            blocks,
            time_source,
            _lock: None,
        })
    }

    /// Volatile ledger on the system clock.
    pub fn in_memory(config: LedgerConfig) -> Result<Self, LedgerError> {
        Self::with_components(LedgerComponents::in_memory(), config)
    }

    /// File-backed ledger in `config.data_dir`.
    ///
    /// Takes an exclusive lock on the directory for the ledger's lifetime.
    pub fn open(config: LedgerConfig) -> Result<Self, LedgerError> {
        Self::open_with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn open_with_time_source(
        config: LedgerConfig,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, LedgerError> {
        let data_dir = config.require_data_dir()?.to_path_buf();
        std::fs::create_dir_all(&data_dir).map_err(|e| io_error(&data_dir, e))?;
        let lock = DatabaseLock::acquire(&data_dir)?;

        let kv_store = Arc::new(FileBackedKVStore::open(data_dir.join(DATABASE_FILE))?);
        let blob_store = Arc::new(
            FileBlobStore::open(data_dir.join(OFF_CHAIN_DIR)).map_err(OffChainError::from)?,
        );
        info!("[ledger] 📂 Opened data directory {}", data_dir.display());

        let mut ledger = Self::with_components(
            LedgerComponents {
                kv_store,
                blob_store,
                time_source,
            },
            config,
        )?;
        ledger._lock = Some(lock);
        Ok(ledger)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Sign and append a block. See [`BlockStore::add_block`].
    pub fn add_block(
        &self,
        data: &[u8],
        signer: &Secp256k1KeyPair,
        options: &BlockOptions,
    ) -> Result<Block, LedgerError> {
        Ok(self.blocks.add_block(data, signer, options)?)
    }

    pub fn block_count(&self) -> u64 {
        self.blocks.block_count()
    }

    pub fn get_block(&self, block_number: u64) -> Result<Block, LedgerError> {
        Ok(self.blocks.get_block(block_number)?)
    }

    pub fn get_block_by_hash(&self, hash: &Hash) -> Result<Option<Block>, LedgerError> {
        Ok(self.blocks.get_block_by_hash(hash)?)
    }

    pub fn last_block(&self) -> Result<Option<Block>, LedgerError> {
        Ok(self.blocks.last_block()?)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Vec<Block>, LedgerError> {
        Ok(self.blocks.search(query)?)
    }

    /// Direct access to the block store (batch iteration, ranges).
    pub fn block_store(&self) -> &BlockStore {
        &self.blocks
    }

    /// Plaintext payload of a block, whichever way it is stored.
    ///
    /// Sealed and encrypted off-chain payloads need the recipient's key.
    pub fn block_data(
        &self,
        block_number: u64,
        key: Option<&Secp256k1KeyPair>,
    ) -> Result<Vec<u8>, LedgerError> {
        let block = self.blocks.get_block(block_number)?;
        match &block.payload {
            BlockPayload::Inline { data } => Ok(data.clone()),
            BlockPayload::Sealed { envelope } => {
                let key = key.ok_or_else(|| {
                    LedgerError::validation(format!(
                        "block #{block_number} is encrypted; a recipient key is required"
                    ))
                })?;
                shared_crypto::open(envelope, key).map_err(|e| {
                    LedgerError::from(OffChainError::Decryption {
                        message: e.to_string(),
                    })
                })
            }
            BlockPayload::OffChain { reference } => {
                Ok(self.off_chain.retrieve(reference, key)?)
            }
        }
    }

    pub fn validate_chain_detailed(&self) -> Result<ChainValidationResult, LedgerError> {
        Ok(validate_chain(&self.blocks, &self.registry)?)
    }

    // =========================================================================
    // Rollback
    // =========================================================================

    pub fn rollback(&self, count: u64) -> Result<RollbackReport, LedgerError> {
        Ok(self.blocks.rollback(count)?)
    }

    pub fn rollback_to_block(&self, target_block_number: u64) -> Result<RollbackReport, LedgerError> {
        Ok(self.blocks.rollback_to_block(target_block_number)?)
    }

    pub fn preview_rollback(&self, count: u64) -> Result<RollbackReport, LedgerError> {
        Ok(self.blocks.preview_rollback(count)?)
    }

    pub fn preview_rollback_to_block(
        &self,
        target_block_number: u64,
    ) -> Result<RollbackReport, LedgerError> {
        Ok(self.blocks.preview_rollback_to_block(target_block_number)?)
    }

    // =========================================================================
    // Authorized keys
    // =========================================================================

    pub fn add_authorized_key(
        &self,
        public_key: &str,
        owner_name: &str,
    ) -> Result<AuthorizedKey, LedgerError> {
        Ok(self.registry.add_key(public_key, owner_name)?)
    }

    pub fn list_keys(&self, active_only: bool) -> Vec<AuthorizedKey> {
        self.registry.list_keys(active_only)
    }

    pub fn lookup_by_owner(&self, owner_name: &str) -> Option<AuthorizedKey> {
        self.registry.lookup_by_owner(owner_name)
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// The registry entry a revocation of `public_key` must be signed for.
    pub fn revocation_target(&self, public_key: &str) -> Result<RevocationTarget, LedgerError> {
        Ok(self.registry.revocation_target(public_key)?)
    }

    /// Revoke an authorized key.
    ///
    /// Keys that signed blocks are refused with `KeyInUse` unless `force` is
    /// set; revoking them turns those blocks into compliance findings. The
    /// admin signs the payload of [`Ledger::revocation_target`] with `reason`
    /// exactly as passed here.
    ///
    /// The revocation takes effect no earlier than one millisecond past the
    /// newest block, so every block already on the chain was signed inside
    /// the key's window even when the clock has not moved.
    ///
    /// Returns `false` if the key was already revoked.
    pub fn dangerously_delete_authorized_key(
        &self,
        public_key: &str,
        force: bool,
        reason: &str,
        admin_signature: &[u8],
        admin_public_key: &str,
    ) -> Result<bool, LedgerError> {
        if reason.trim().is_empty() {
            return Err(RegistryError::EmptyReason.into());
        }
        let public_key = shared_crypto::decode_public_key(public_key)
            .map_err(RegistryError::InvalidKey)?
            .encode();

        // Hold the chain read lock so no block by this key lands before the revocation
        let mut batches = self.blocks.batches();
        let mut signed_blocks = 0u64;
        let mut not_before = 0;
        for batch in batches.by_ref() {
            for block in batch? {
                if block.signer_public_key == public_key {
                    signed_blocks += 1;
                }
                not_before = not_before.max(block.timestamp.saturating_add(1));
            }
        }
        if signed_blocks > 0 && !force {
            return Err(LedgerError::KeyInUse {
                public_key,
                signed_blocks,
            });
        }

        let revoked = self.registry.revoke_key_not_before(
            &public_key,
            admin_signature,
            admin_public_key,
            reason,
            not_before,
        )?;
        drop(batches);

        if revoked && signed_blocks > 0 {
            warn!(
                "[ledger] ⚠️ Force-revoked key that signed {} block(s); they are now compliance findings",
                signed_blocks
            );
        }
        Ok(revoked)
    }

    // =========================================================================
    // Off-chain
    // =========================================================================

    /// Store a payload off-chain without a block.
    ///
    /// The blob stays retrievable even if a block with the same plaintext is
    /// later rolled back.
    pub fn store_off_chain(
        &self,
        data: &[u8],
        recipient: Option<&str>,
    ) -> Result<OffChainReference, LedgerError> {
        Ok(self.blocks.store_off_chain(data, recipient)?)
    }

    pub fn store_off_chain_file(
        &self,
        path: &Path,
        recipient: Option<&str>,
    ) -> Result<OffChainReference, LedgerError> {
        let data = std::fs::read(path).map_err(|e| io_error(path, e))?;
        self.store_off_chain(&data, recipient)
    }

    pub fn retrieve_off_chain(
        &self,
        reference: &OffChainReference,
        key: Option<&Secp256k1KeyPair>,
    ) -> Result<Vec<u8>, LedgerError> {
        Ok(self.off_chain.retrieve(reference, key)?)
    }

    pub(crate) fn now(&self) -> shared_types::Timestamp {
        self.time_source.now()
    }
}

fn io_error(path: &Path, e: std::io::Error) -> LedgerError {
    LedgerError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
