use crate::domain::errors::BlobStoreError;
use crate::ports::BlobStore;
use shared_types::{hash_from_hex, hash_to_hex, Hash};
use std::io::Write;
use std::path::{Path, PathBuf};

const BLOB_EXTENSION: &str = "blob";

/// One file per blob under a directory.
///
/// Files are named `{blob_id_hex}.blob`. Writes go to a hidden temp file that
/// is fsynced and renamed into place, so a crash never leaves a partial blob
/// under a valid name.
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Open (or create) a blob directory.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, BlobStoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(BlobStoreError::io)?;
        tracing::info!("[lc-02] 📁 Off-chain blob directory at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final location of a blob.
    pub fn path_for(&self, id: &Hash) -> PathBuf {
        self.root
            .join(format!("{}.{}", hash_to_hex(id), BLOB_EXTENSION))
    }

    fn temp_path_for(&self, id: &Hash) -> PathBuf {
        self.root.join(format!(".{}.tmp", hash_to_hex(id)))
    }
}

impl BlobStore for FileBlobStore {
    fn write(&self, id: &Hash, bytes: &[u8]) -> Result<(), BlobStoreError> {
        let temp_path = self.temp_path_for(id);
        let result = (|| {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, self.path_for(id))
        })();

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(BlobStoreError::io(e));
        }
        Ok(())
    }

    fn read(&self, id: &Hash) -> Result<Option<Vec<u8>>, BlobStoreError> {
        match std::fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobStoreError::io(e)),
        }
    }

    fn remove(&self, id: &Hash) -> Result<bool, BlobStoreError> {
        match std::fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobStoreError::io(e)),
        }
    }

    fn list(&self) -> Result<Vec<Hash>, BlobStoreError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(BlobStoreError::io)? {
            let path = entry.map_err(BlobStoreError::io)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BLOB_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(hash_from_hex)
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}
