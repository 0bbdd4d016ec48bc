//! Local filesystem storage implementation.
//!
//! Writes go to `<file>.tmp` first and are renamed into place, so an
//! interrupted or failed run never leaves a half-written document.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{FullDataResponse, OutputConfig};
use crate::storage::DocumentStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    file_name: String,
}

impl LocalStorage {
    pub fn new(root_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.dir.clone(), output.file_name.clone())
    }

    /// Full path of the document.
    pub fn path(&self) -> PathBuf {
        self.root_dir.join(&self.file_name)
    }

    fn tmp_path(&self) -> PathBuf {
        self.path().with_extension("tmp")
    }

    /// Remove the temp file of a write that never completed.
    ///
    /// Returns whether there was one.
    pub async fn discard_partial(&self) -> Result<bool> {
        match tokio::fs::remove_file(self.tmp_path()).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(path)
    }
}

#[async_trait]
impl DocumentStorage for LocalStorage {
    async fn write_document(&self, document: &FullDataResponse) -> Result<PathBuf> {
        // serde_json leaves non-ASCII text unescaped
        let bytes = serde_json::to_vec_pretty(document)?;
        let path = self.write_bytes(&bytes).await?;
        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    async fn load_document(&self) -> Result<Option<FullDataResponse>> {
        match tokio::fs::read(self.path()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
