use super::{apply_batch, scan_prefix, BatchOperation, KVStoreError, KeyValueStore, ScanResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File-backed key-value store.
///
/// The full map is held in memory and rewritten to disk on every mutation via
/// a temp file and rename. A mutation is applied to a copy first; the live map
/// is only swapped once the file is durable, so a failed write leaves both the
/// file and the in-memory view unchanged.
///
/// # Cost
///
/// Every `put`, `delete` and `atomic_batch_write` clones the map and writes
/// the whole file, so a mutation is O(store size) in memory and I/O. Appending
/// one block to a chain of N blocks rewrites all N records. Group related
/// writes into one `atomic_batch_write`; for large ledgers plug in a
/// log-structured `KeyValueStore` instead.
pub struct FileBackedKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open (or create) a store at the given path.
    ///
    /// A missing file yields an empty store. A truncated or malformed file is
    /// reported as corruption instead of being silently discarded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let data = Self::load_from_file(&path)?;
            tracing::info!(
                "[kv] 💾 Loaded {} keys from {}",
                data.len(),
                path.display()
            );
            data
        } else {
            tracing::info!("[kv] 📁 No existing storage file at {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            data: RwLock::new(data),
            path,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut file = std::fs::File::open(path).map_err(KVStoreError::io)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(KVStoreError::io)?;

        // Format: [key_len:u32][key][value_len:u32][value]...
        let mut data = BTreeMap::new();
        let mut cursor = 0;

        let truncated = || KVStoreError::CorruptionError {
            message: format!("truncated record in {}", path.display()),
        };

        while cursor < bytes.len() {
            let key = read_chunk(&bytes, &mut cursor).ok_or_else(truncated)?;
            let value = read_chunk(&bytes, &mut cursor).ok_or_else(truncated)?;
            data.insert(key, value);
        }

        Ok(data)
    }

    fn save_to_file(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(KVStoreError::io)?;
        }

        let mut bytes = Vec::new();
        for (key, value) in data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(KVStoreError::io)?;
        file.write_all(&bytes).map_err(KVStoreError::io)?;
        file.sync_all().map_err(KVStoreError::io)?;
        std::fs::rename(&temp_path, &self.path).map_err(KVStoreError::io)?;

        Ok(())
    }

    fn mutate(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut guard = self.data.write();
        let mut next = guard.clone();
        apply_batch(&mut next, operations);
        self.save_to_file(&next)?;
        *guard = next;
        Ok(())
    }
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Option<Vec<u8>> {
    let len_end = cursor.checked_add(4)?;
    let len = u32::from_le_bytes(bytes.get(*cursor..len_end)?.try_into().ok()?) as usize;
    let end = len_end.checked_add(len)?;
    let chunk = bytes.get(len_end..end)?.to_vec();
    *cursor = end;
    Some(chunk)
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.mutate(vec![BatchOperation::put(key, value)])
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.mutate(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.mutate(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_prefix(&self.data.read(), prefix))
    }
}
