//! Blob sink for uploaded files.
//!
//! Files live on the local filesystem under `storage.upload_dir` and are
//! served back at `<public_base_url>/uploads/<file>`. The base URL may carry
//! a path when the API sits behind a prefix-routing proxy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// URL path prefix the upload directory is served under
pub const UPLOADS_PREFIX: &str = "/uploads/";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a stored file URL: {0}")]
    InvalidUrl(String),
}

/// Outcome of a best-effort blob removal. Never an error: callers log it and
/// carry on, since the metadata change is the authoritative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum BlobRemoval {
    Removed,
    Missing,
    Failed(String),
}

impl BlobRemoval {
    pub fn is_removed(&self) -> bool {
        matches!(self, BlobRemoval::Removed)
    }
}

#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Persist `bytes` and return the public URL of the stored file.
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    async fn delete(&self, url: &str) -> BlobRemoval;
}

/// Filesystem-backed sink.
#[derive(Debug, Clone)]
pub struct LocalBlobSink {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobSink {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir, &config.public_base_url)
    }

    fn stored_name(original_name: &str) -> String {
        let id = Uuid::new_v4().simple();
        match sanitized_extension(original_name) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        }
    }
}

#[async_trait]
impl BlobSink for LocalBlobSink {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = Self::stored_name(original_name);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::debug!("Stored blob {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{}{}{}", self.public_base_url, UPLOADS_PREFIX, file_name))
    }

    async fn delete(&self, url: &str) -> BlobRemoval {
        let file_name = match file_name_from_url(url, &self.public_base_url) {
            Ok(name) => name,
            Err(e) => return BlobRemoval::Failed(e.to_string()),
        };

        match tokio::fs::remove_file(self.dir.join(&file_name)).await {
            Ok(()) => BlobRemoval::Removed,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BlobRemoval::Missing,
            Err(e) => BlobRemoval::Failed(e.to_string()),
        }
    }
}

/// Keep only short alphanumeric extensions; anything else is dropped.
fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Resolve the stored file name from a public URL issued under
/// `public_base_url`. Only a single path segment directly under
/// `<base path>/uploads/` is accepted.
pub fn file_name_from_url(url: &str, public_base_url: &str) -> Result<String, StorageError> {
    let invalid = || StorageError::InvalidUrl(url.to_string());
    let parsed = url::Url::parse(url).map_err(|_| invalid())?;
    let base = url::Url::parse(public_base_url).map_err(|_| invalid())?;

    if parsed.origin() != base.origin() {
        return Err(invalid());
    }

    let prefix = format!("{}{}", base.path().trim_end_matches('/'), UPLOADS_PREFIX);
    let name = parsed.path().strip_prefix(&prefix).ok_or_else(invalid)?;

    if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
        return Err(StorageError::InvalidUrl(url.to_string()));
    }
    Ok(name.to_string())
}
