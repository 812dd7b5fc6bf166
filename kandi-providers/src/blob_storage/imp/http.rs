//! Blob store reached over plain HTTP `PUT` uploads.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    blob_storage::{local_path_from_uri, BlobStorage, BlobStorageError},
    http_client::{HttpClient, HttpClientError, HttpRequest},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub base_url: Url,
    pub bearer_token: Option<String>,
}

pub struct HttpBlobStorage {
    client: Arc<dyn HttpClient>,
    params: Params,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponseDTO {
    download_url: Option<String>,
}

impl HttpBlobStorage {
    pub fn new(client: Arc<dyn HttpClient>, params: Params) -> Self {
        Self { client, params }
    }

    fn object_url(&self, key: &str) -> Result<Url, BlobStorageError> {
        let mut url = self.params.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BlobStorageError::InvalidPath(self.params.base_url.to_string()))?
            .pop_if_empty()
            .extend(key.split('/').filter(|segment| !segment.is_empty()));

        Ok(url)
    }
}

#[async_trait]
impl BlobStorage for HttpBlobStorage {
    async fn upload(&self, local_uri: &str, key: &str) -> Result<String, BlobStorageError> {
        let path = local_path_from_uri(local_uri)?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|err| BlobStorageError::ReadFile(format!("{path}: {err}")))?;

        let url = self.object_url(key)?;

        let mut request = HttpRequest::put(url.as_str())
            .header("Content-Type", content_type(key))
            .body(content);
        if let Some(token) = &self.params.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = self
            .client
            .send(request)
            .await
            .map_err(|err| BlobStorageError::Transport(err.into()))?
            .error_for_status()
            .map_err(|err| match err {
                HttpClientError::Status(status) => {
                    BlobStorageError::Rejected(format!("{key} returned status {status}"))
                }
                other => BlobStorageError::Transport(other.into()),
            })?;

        tracing::debug!(%key, status = %response.status, "photo uploaded");

        if response.body.is_empty() {
            return Ok(url.to_string());
        }

        let uploaded: UploadResponseDTO = response
            .json()
            .map_err(|err| BlobStorageError::Transport(err.into()))?;

        Ok(uploaded.download_url.unwrap_or_else(|| url.to_string()))
    }
}

fn content_type(key: &str) -> &'static str {
    let lowercase = key.to_ascii_lowercase();
    if lowercase.ends_with(".jpg") || lowercase.ends_with(".jpeg") {
        "image/jpeg"
    } else if lowercase.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}
