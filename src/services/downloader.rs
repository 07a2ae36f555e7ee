// src/services/downloader.rs

//! Streamed document download.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{AppError, Result};
use crate::models::TransferConfig;
use crate::utils::http::create_async_client;

/// Write buffer size; chunks reach the file in blocks of this size.
pub const CHUNK_SIZE: usize = 8192;

/// Source of document bytes.
#[async_trait]
pub trait DocumentTransfer: Send + Sync {
    /// Start a transfer and return its body as a stream of chunks.
    async fn fetch_stream(&self, url: &str) -> Result<BoxStream<'static, Result<Vec<u8>>>>;
}

/// HTTP transfer backed by reqwest.
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(config: &TransferConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl DocumentTransfer for HttpTransfer {
    async fn fetch_stream(&self, url: &str) -> Result<BoxStream<'static, Result<Vec<u8>>>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(AppError::from))
            .boxed())
    }
}

/// Result of one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed { bytes: u64 },
    Failed { reason: String },
}

/// Stream a document into `dest`.
///
/// The body lands in `<dest>.part` and is renamed once the stream ends.
/// Failures are logged, the partial file is removed and the outcome is
/// reported instead of returned as an error, so the walk can go on.
pub async fn download(transfer: &dyn DocumentTransfer, url: &str, dest: &Path) -> DownloadOutcome {
    let part = part_path(dest);

    let result = async {
        let bytes = write_stream(transfer, url, &part).await?;
        tokio::fs::rename(&part, dest).await?;
        Ok::<_, AppError>(bytes)
    }
    .await;

    match result {
        Ok(bytes) => {
            log::info!("Downloaded {} bytes to {}", bytes, dest.display());
            DownloadOutcome::Completed { bytes }
        }
        Err(e) => {
            log::error!("Error while saving {}: {}", dest.display(), e);
            if let Err(cleanup) = tokio::fs::remove_file(&part).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not remove {}: {}", part.display(), cleanup);
                }
            }
            DownloadOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

async fn write_stream(transfer: &dyn DocumentTransfer, url: &str, part: &Path) -> Result<u64> {
    let mut stream = transfer.fetch_stream(url).await?;
    let file = tokio::fs::File::create(part).await?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
