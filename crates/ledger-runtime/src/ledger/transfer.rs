//! Export and import of the whole ledger.

use super::Ledger;
use crate::errors::LedgerError;
use crate::transfer::{ChainExport, ExportedBlob, ImportOptions, ImportReport, EXPORT_FORMAT_VERSION};
use lc_01_key_registry::{AuthorizedKey, RegistrySnapshot};
use lc_04_chain_validation::validate_blocks;
use shared_types::{short_hash, Hash};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::info;
use uuid::Uuid;

impl Ledger {
    /// Snapshot every block, registry entry and referenced blob.
    ///
    /// Runs under the chain read lock, so the document describes a single
    /// committed state.
    pub fn export_chain(&self) -> Result<ChainExport, LedgerError> {
        let mut batches = self.blocks.batches();
        let mut blocks = Vec::with_capacity(batches.chain_len() as usize);
        for batch in batches.by_ref() {
            blocks.extend(batch?);
        }
        let authorized_keys = self.registry.list_keys(false);

        let blob_ids: BTreeSet<Hash> = blocks
            .iter()
            .filter_map(|b| b.off_chain_reference().map(|r| r.blob_id))
            .collect();
        let mut off_chain_blobs = Vec::with_capacity(blob_ids.len());
        for blob_id in blob_ids {
            off_chain_blobs.push(ExportedBlob {
                blob_id,
                data: self.off_chain.read_raw(&blob_id)?,
            });
        }
        drop(batches);

        info!(
            "[ledger] 📤 Exported {} blocks, {} key entries, {} off-chain blobs",
            blocks.len(),
            authorized_keys.len(),
            off_chain_blobs.len()
        );
        Ok(ChainExport {
            format_version: EXPORT_FORMAT_VERSION,
            export_id: Uuid::new_v4(),
            exported_at: self.now(),
            blocks,
            authorized_keys,
            off_chain_blobs,
        })
    }

    pub fn export_json(&self) -> Result<String, LedgerError> {
        self.export_chain()?.to_json()
    }

    /// Replace the ledger with `document`.
    ///
    /// The document is checked before anything changes: format version,
    /// registry entries, blob ids and presence, and structural validation of
    /// the chain against the document's own registry. Compliance findings
    /// (revoked or unauthorized signers) are reported, not refused.
    ///
    /// With `dry_run` the report is returned without committing, even for a
    /// structurally broken chain.
    pub fn import_chain(
        &self,
        document: ChainExport,
        options: ImportOptions,
    ) -> Result<ImportReport, LedgerError> {
        if document.format_version != EXPORT_FORMAT_VERSION {
            return Err(LedgerError::UnsupportedFormat {
                found: document.format_version,
                supported: EXPORT_FORMAT_VERSION,
            });
        }
        check_registry_entries(&document.authorized_keys)?;
        let blobs = collect_blobs(&document)?;

        let snapshot = RegistrySnapshot::from_entries(document.authorized_keys.clone());
        let validation = validate_blocks(&document.blocks, &snapshot);

        let report = ImportReport {
            previous_blocks: self.blocks.block_count(),
            previous_keys: self.registry.counts().total as u64,
            new_blocks: document.blocks.len() as u64,
            new_keys: document.authorized_keys.len() as u64,
            off_chain_blobs: blobs.len() as u64,
            validation,
            dry_run: options.dry_run,
        };

        if options.dry_run {
            info!(
                "[ledger] 🧪 Import dry run: {} -> {} blocks ({})",
                report.previous_blocks, report.new_blocks, report.validation.summary
            );
            return Ok(report);
        }
        if !report.validation.is_structurally_intact {
            return Err(LedgerError::integrity(format!(
                "import rejected: {}",
                report.validation.summary
            )));
        }

        self.blocks
            .replace_chain(document.blocks, document.authorized_keys, &blobs)?;
        info!(
            "[ledger] 📥 Imported {} blocks and {} key entries (was {} blocks)",
            report.new_blocks, report.new_keys, report.previous_blocks
        );
        Ok(report)
    }

    pub fn import_json(&self, json: &str, options: ImportOptions) -> Result<ImportReport, LedgerError> {
        self.import_chain(ChainExport::from_json(json)?, options)
    }
}

/// Keys decode, owners are named, and no key has two active entries.
fn check_registry_entries(entries: &[AuthorizedKey]) -> Result<(), LedgerError> {
    let mut active = HashSet::new();
    for entry in entries {
        let canonical = shared_crypto::decode_public_key(&entry.public_key)
            .map_err(|e| LedgerError::validation(format!("registry entry has an invalid key: {e}")))?
            .encode();
        if canonical != entry.public_key {
            return Err(LedgerError::validation(format!(
                "registry key {} is not in canonical encoding",
                entry.public_key
            )));
        }
        if entry.owner_name.trim().is_empty() {
            return Err(LedgerError::validation("registry entry has an empty owner name"));
        }
        if entry.is_active() && !active.insert(entry.public_key.as_str()) {
            return Err(LedgerError::validation(format!(
                "key {} has more than one active entry",
                entry.public_key
            )));
        }
    }
    Ok(())
}

/// Verify every blob against its id and require one for each reference.
fn collect_blobs(document: &ChainExport) -> Result<Vec<Vec<u8>>, LedgerError> {
    let mut by_id: BTreeMap<Hash, &[u8]> = BTreeMap::new();
    for blob in &document.off_chain_blobs {
        if shared_crypto::sha256(&blob.data) != blob.blob_id {
            return Err(LedgerError::integrity(format!(
                "off-chain blob {} does not match its id",
                short_hash(&blob.blob_id)
            )));
        }
        by_id.insert(blob.blob_id, &blob.data);
    }

    let mut needed = BTreeSet::new();
    for block in &document.blocks {
        if let Some(reference) = block.off_chain_reference() {
            if !by_id.contains_key(&reference.blob_id) {
                return Err(LedgerError::integrity(format!(
                    "block #{} references off-chain blob {} missing from the document",
                    block.block_number,
                    short_hash(&reference.blob_id)
                )));
            }
            needed.insert(reference.blob_id);
        }
    }

    // Unreferenced blobs in the document are dropped
    Ok(needed
        .into_iter()
        .filter_map(|id| by_id.get(&id).map(|data| data.to_vec()))
        .collect())
}
