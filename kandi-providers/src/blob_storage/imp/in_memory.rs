use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::blob_storage::{local_path_from_uri, BlobStorage, BlobStorageError};

/// Records uploads without touching the filesystem; URLs use the `memory://` scheme.
#[derive(Clone, Default)]
pub struct InMemoryBlobStorage {
    uploads: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryBlobStorage {
    /// Local path stored under `key`, if anything was uploaded there.
    pub async fn source_of(&self, key: &str) -> Option<String> {
        self.uploads.lock().await.get(key).cloned()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.lock().await.len()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn upload(&self, local_uri: &str, key: &str) -> Result<String, BlobStorageError> {
        let path = local_path_from_uri(local_uri)?;

        self.uploads
            .lock()
            .await
            .insert(key.to_owned(), path.to_owned());

        Ok(format!("memory://{key}"))
    }
}
