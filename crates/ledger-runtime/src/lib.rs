//! # Ledger Runtime
//!
//! Facade over the Ledger-Chain subsystems.
//!
//! | Subsystem | Crate | Role |
//! |-----------|-------|------|
//! | Key registry | `lc-01-key-registry` | Who may sign, and when |
//! | Off-chain storage | `lc-02-offchain-storage` | Content-addressed payload blobs |
//! | Block storage | `lc-03-block-storage` | The hash-linked chain |
//! | Chain validation | `lc-04-chain-validation` | Structural and compliance checks |
//!
//! ```ignore
//! let ledger = Ledger::open(LedgerConfig::from_env()?)?;
//! let block = ledger.add_block(b"hello", &signer, &BlockOptions::default())?;
//! let result = ledger.validate_chain_detailed()?;
//! ```

pub mod config;
pub mod errors;
pub mod ledger;
pub mod lock;
pub mod logging;
pub mod transfer;

pub use config::{ConfigError, LedgerConfig};
pub use errors::LedgerError;
pub use ledger::{
    Ledger, LedgerComponents, LedgerStatus, OffChainAudit, OffChainStatistics, TipSummary,
};
pub use lock::{DatabaseLock, LockError};
pub use logging::init_tracing;
pub use transfer::{ChainExport, ExportedBlob, ImportOptions, ImportReport, EXPORT_FORMAT_VERSION};

// Types callers need to drive the facade
pub use lc_01_key_registry::{
    revocation_payload, sign_revocation, AuthorizedKey, KeyStatus, RevocationTarget,
};
pub use lc_02_offchain_storage::OffChainReference;
pub use lc_03_block_storage::{Block, BlockOptions, BlockPayload, RollbackReport, SearchQuery};
pub use lc_04_chain_validation::{BlockFinding, BlockStatus, ChainValidationResult};
pub use shared_crypto::Secp256k1KeyPair;
pub use shared_types::ErrorKind;
