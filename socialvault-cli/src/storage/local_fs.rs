use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use socialvault_core::error::VaultError;
use socialvault_core::traits::storage::{ContentReference, ContentStore};

/// Content-addressed payload store on the local filesystem.
///
/// Payloads live at `{home}/blobs/{id}` where `id` is the lowercase hex
/// SHA-256 of the bytes.
pub struct LocalFsStore {
    blobs_dir: PathBuf,
}

impl LocalFsStore {
    pub fn new(blobs_dir: &Path) -> Self {
        Self {
            blobs_dir: blobs_dir.to_path_buf(),
        }
    }

    fn content_id(payload: &[u8]) -> String {
        hex::encode(Sha256::digest(payload))
    }

    fn blob_path(&self, id: &str) -> Result<PathBuf, VaultError> {
        let well_formed = id.len() == 64
            && id
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(VaultError::Storage(format!("malformed content id: {id}")));
        }
        Ok(self.blobs_dir.join(id))
    }

    /// Ids of every payload currently stored.
    pub async fn list_ids(&self) -> Result<Vec<String>, VaultError> {
        let mut ids = Vec::new();

        if !self.blobs_dir.exists() {
            return Ok(ids);
        }

        let mut entries = fs::read_dir(&self.blobs_dir)
            .await
            .map_err(|e| VaultError::Storage(format!("read blobs dir failed: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| VaultError::Storage(format!("read dir entry failed: {e}")))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.blob_path(&name).is_ok() {
                ids.push(name);
            }
        }

        ids.sort();
        debug!("Listed {} blobs", ids.len());
        Ok(ids)
    }
}

fn tmp_suffix() -> Result<String, VaultError> {
    let mut bytes = [0u8; 8];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| VaultError::Storage(format!("temp name generation failed: {e}")))?;
    Ok(hex::encode(bytes))
}

async fn write_durably(tmp_path: &Path, path: &Path, payload: &[u8]) -> Result<(), VaultError> {
    let mut file = fs::File::create(tmp_path)
        .await
        .map_err(|e| VaultError::Storage(format!("create blob failed: {e}")))?;
    file.write_all(payload)
        .await
        .map_err(|e| VaultError::Storage(format!("write blob failed: {e}")))?;
    file.sync_all()
        .await
        .map_err(|e| VaultError::Storage(format!("sync blob failed: {e}")))?;
    drop(file);

    fs::rename(tmp_path, path)
        .await
        .map_err(|e| VaultError::Storage(format!("rename blob failed: {e}")))
}

#[async_trait(?Send)]
impl ContentStore for LocalFsStore {
    async fn upload(&self, payload: &[u8]) -> Result<ContentReference, VaultError> {
        let id = Self::content_id(payload);
        let path = self.blob_path(&id)?;

        fs::create_dir_all(&self.blobs_dir)
            .await
            .map_err(|e| VaultError::Storage(format!("create blobs dir failed: {e}")))?;

        // Write to a uniquely named sibling, fsync, then rename into place so a
        // crash never leaves a truncated blob under its final id.
        let tmp_path = self.blobs_dir.join(format!("{id}.{}.tmp", tmp_suffix()?));
        if let Err(e) = write_durably(&tmp_path, &path, payload).await {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {cleanup}", tmp_path.display());
                }
            }
            return Err(e);
        }

        debug!("Stored blob {} ({} bytes)", id, payload.len());
        Ok(ContentReference {
            id,
            size: payload.len() as u64,
        })
    }

    async fn retrieve(&self, id: &str) -> Result<Vec<u8>, VaultError> {
        let path = self.blob_path(id)?;

        if !path.exists() {
            return Err(VaultError::NotFound(format!("blob not found: {id}")));
        }

        let data = fs::read(&path)
            .await
            .map_err(|e| VaultError::Storage(format!("read blob failed: {e}")))?;

        if Self::content_id(&data) != id {
            return Err(VaultError::Storage(format!(
                "blob {id} failed integrity check"
            )));
        }

        debug!("Retrieved blob {} ({} bytes)", id, data.len());
        Ok(data)
    }

    async fn remove(&self, id: &str) -> Result<(), VaultError> {
        let path = self.blob_path(id)?;

        if !path.exists() {
            return Err(VaultError::NotFound(format!("blob not found: {id}")));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| VaultError::Storage(format!("delete blob failed: {e}")))?;

        debug!("Deleted blob {}", id);
        Ok(())
    }
}
