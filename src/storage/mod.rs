//! Content store for materialized program nodes.
//!
//! ## Directory Structure
//!
//! ```text
//! universities/
//! └── <institution>/
//!     └── <program>_<code>/
//!         ├── <program>_<code>.pdf
//!         └── metadata.txt
//! ```
//!
//! A node is complete when its document reaches the configured minimum size
//! and `metadata.txt` exists. Metadata is only written after the document
//! transfer succeeded, so it doubles as the completion marker.

pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::utils::sanitize;

pub use local::LocalStore;

/// File name of the per-node metadata record.
pub const METADATA_FILE: &str = "metadata.txt";

/// Storage location of one program, relative to the store root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramNode {
    institution: String,
    dir_name: String,
}

impl ProgramNode {
    /// Build a node from scraped labels; every segment is sanitized.
    pub fn new(institution: &str, program_name: &str, external_code: &str) -> Self {
        Self {
            institution: sanitize(institution),
            dir_name: format!("{}_{}", sanitize(program_name), sanitize(external_code)),
        }
    }

    /// Rebuild a node from an existing directory name.
    pub fn from_dir_name(institution_dir: &str, dir_name: &str) -> Self {
        Self {
            institution: institution_dir.to_string(),
            dir_name: dir_name.to_string(),
        }
    }

    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    pub fn institution_dir(&self) -> PathBuf {
        PathBuf::from(&self.institution)
    }

    pub fn dir(&self) -> PathBuf {
        self.institution_dir().join(&self.dir_name)
    }

    pub fn document(&self) -> PathBuf {
        self.dir().join(format!("{}.pdf", self.dir_name))
    }

    pub fn metadata(&self) -> PathBuf {
        self.dir().join(METADATA_FILE)
    }
}

/// Relative directory of an institution.
pub fn institution_dir(label: &str) -> PathBuf {
    PathBuf::from(sanitize(label))
}

/// Materialization state of one institution directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionStatus {
    pub institution: String,
    pub materialized: usize,
    /// Node directories missing an artifact
    pub incomplete: Vec<String>,
}

/// Trait for content store backends. Paths are relative to the store root.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Absolute location of a relative path.
    fn path(&self, rel: &Path) -> PathBuf;

    /// Smallest document accepted as a finished download.
    fn min_document_bytes(&self) -> u64;

    /// Create a directory and all missing ancestors; no-op if present.
    async fn ensure_dir(&self, rel: &Path) -> Result<()>;

    /// Whether a file or directory exists.
    async fn exists(&self, rel: &Path) -> bool;

    /// Size of a file, `None` if it is missing.
    async fn file_size(&self, rel: &Path) -> Option<u64>;

    /// Write bytes unless the target exists. Returns whether a write happened.
    async fn write_once(&self, rel: &Path, bytes: &[u8]) -> Result<bool>;

    /// Wipe a node directory and recreate it empty. Never fails.
    async fn reset_node(&self, rel: &Path);

    /// Names of the immediate subdirectories, sorted.
    async fn list_dirs(&self, rel: &Path) -> Result<Vec<String>>;

    /// Whether both artifacts of a node are present.
    async fn is_complete(&self, node: &ProgramNode) -> bool {
        let document_ok = self
            .file_size(&node.document())
            .await
            .is_some_and(|size| size >= self.min_document_bytes());
        document_ok && self.exists(&node.metadata()).await
    }

    /// Number of complete nodes under an institution directory.
    async fn count_materialized(&self, institution: &Path) -> Result<usize> {
        Ok(self.institution_status(institution).await?.materialized)
    }

    /// Complete and incomplete nodes under an institution directory.
    async fn institution_status(&self, institution: &Path) -> Result<InstitutionStatus> {
        let name = institution.to_string_lossy().to_string();
        let mut status = InstitutionStatus {
            institution: name.clone(),
            materialized: 0,
            incomplete: Vec::new(),
        };
        if !self.exists(institution).await {
            return Ok(status);
        }
        for dir_name in self.list_dirs(institution).await? {
            let node = ProgramNode::from_dir_name(&name, &dir_name);
            if self.is_complete(&node).await {
                status.materialized += 1;
            } else {
                status.incomplete.push(dir_name);
            }
        }
        Ok(status)
    }

    /// Status of every institution directory under the root.
    async fn scan(&self) -> Result<Vec<InstitutionStatus>> {
        let mut statuses = Vec::new();
        if !self.exists(Path::new("")).await {
            return Ok(statuses);
        }
        for institution in self.list_dirs(Path::new("")).await? {
            statuses.push(self.institution_status(Path::new(&institution)).await?);
        }
        Ok(statuses)
    }
}
