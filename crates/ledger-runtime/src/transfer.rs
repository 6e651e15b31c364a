//! # Export Document
//!
//! Self-contained JSON snapshot of a ledger: every block, every registry
//! entry (including revoked history) and every referenced off-chain blob.

use crate::errors::LedgerError;
use lc_01_key_registry::AuthorizedKey;
use lc_03_block_storage::Block;
use lc_04_chain_validation::ChainValidationResult;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, hex::Hex, serde_as};
use shared_types::{Hash, Timestamp};
use uuid::Uuid;

/// Version written by this build and the only one it imports.
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExport {
    pub format_version: u32,
    pub export_id: Uuid,
    pub exported_at: Timestamp,
    pub blocks: Vec<Block>,
    pub authorized_keys: Vec<AuthorizedKey>,
    #[serde(default)]
    pub off_chain_blobs: Vec<ExportedBlob>,
}

/// Stored bytes of one off-chain blob, exactly as the blob store holds them.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBlob {
    #[serde_as(as = "Hex")]
    pub blob_id: Hash,
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
}

impl ChainExport {
    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json).map_err(|e| LedgerError::Serialization {
            message: e.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Validate and report without changing the ledger.
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// Outcome of an import, or of a dry run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub previous_blocks: u64,
    pub previous_keys: u64,
    pub new_blocks: u64,
    pub new_keys: u64,
    pub off_chain_blobs: u64,
    /// Validation of the imported chain against the imported registry.
    pub validation: ChainValidationResult,
    pub dry_run: bool,
}
