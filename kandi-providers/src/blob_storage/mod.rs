//! Blob store receiving kandi photos and handing back durable URLs.

use thiserror::Error;

pub mod imp;


const FILE_SCHEME: &str = "file://";

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait BlobStorage: Send + Sync {
    /// Uploads the file at `local_uri` under `key` and returns its download URL.
    async fn upload(&self, local_uri: &str, key: &str) -> Result<String, BlobStorageError>;
}

#[derive(Debug, Error)]
pub enum BlobStorageError {
    #[error("Invalid local path: `{0}`")]
    InvalidPath(String),
    #[error("Could not read local file: `{0}`")]
    ReadFile(String),
    #[error("Upload rejected: `{0}`")]
    Rejected(String),
    #[error("Transport error: `{0}`")]
    Transport(anyhow::Error),
}

/// Picker and camera results come back either as bare paths or as `file://` URIs.
pub fn to_file_uri(path: &str) -> String {
    if path.starts_with(FILE_SCHEME) {
        path.to_owned()
    } else {
        format!("{FILE_SCHEME}{path}")
    }
}

pub fn local_path_from_uri(uri: &str) -> Result<&str, BlobStorageError> {
    let path = uri.strip_prefix(FILE_SCHEME).unwrap_or(uri);

    if path.trim().is_empty() {
        return Err(BlobStorageError::InvalidPath(uri.to_owned()));
    }

    Ok(path)
}
