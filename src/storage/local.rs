//! Local filesystem storage implementation.
//!
//! Single writer: the walker is the only process touching the tree, so no
//! locking is done. Partial nodes are repaired by [`ContentStore::reset_node`]
//! rather than by transactions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::ContentStore;

/// Local filesystem content store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
    min_document_bytes: u64,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            min_document_bytes: StorageConfig::default().min_document_bytes,
        }
    }

    /// Create a LocalStore from the storage section of the config.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            min_document_bytes: config.min_document_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    fn path(&self, rel: &Path) -> PathBuf {
        self.root_dir.join(rel)
    }

    fn min_document_bytes(&self) -> u64 {
        self.min_document_bytes
    }

    async fn ensure_dir(&self, rel: &Path) -> Result<()> {
        tokio::fs::create_dir_all(self.path(rel)).await?;
        Ok(())
    }

    async fn exists(&self, rel: &Path) -> bool {
        tokio::fs::try_exists(self.path(rel)).await.unwrap_or(false)
    }

    async fn file_size(&self, rel: &Path) -> Option<u64> {
        match tokio::fs::metadata(self.path(rel)).await {
            Ok(meta) if meta.is_file() => Some(meta.len()),
            _ => None,
        }
    }

    /// Write through a temp file, then rename.
    async fn write_once(&self, rel: &Path, bytes: &[u8]) -> Result<bool> {
        if self.exists(rel).await {
            log::info!("Already present, not overwriting {}", rel.display());
            return Ok(false);
        }

        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(true)
    }

    async fn reset_node(&self, rel: &Path) {
        let path = self.path(rel);
        if !self.exists(rel).await {
            log::debug!("Nothing to reset at {}", path.display());
            return;
        }

        let result: Result<()> = async {
            tokio::fs::remove_dir_all(&path).await?;
            tokio::fs::create_dir_all(&path).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => log::info!("Reset partial node {}", path.display()),
            Err(e) => log::error!("Failed to reset {}: {}", path.display(), e),
        }
    }

    async fn list_dirs(&self, rel: &Path) -> Result<Vec<String>> {
        let path = self.path(rel);
        let mut entries = tokio::fs::read_dir(&path).await?;
        let mut dirs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                let name = entry.file_name().into_string().map_err(|name| {
                    AppError::validation(format!("Non UTF-8 directory name {name:?}"))
                })?;
                dirs.push(name);
            }
        }

        dirs.sort();
        Ok(dirs)
    }
}
