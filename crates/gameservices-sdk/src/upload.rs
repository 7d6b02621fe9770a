//! Blob storage side of the staged uploads.
//!
//! The management API hands out a pre-authorized URL; the file bytes go
//! straight to storage without subscription credentials or API headers.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::uri::{BLOB_TYPE_HEADER, BLOCK_BLOB};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Blob request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Blob storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A file to hand to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, naming it after the last path component.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, data })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Writes a payload to a pre-authorized blob URL.
#[async_trait]
pub trait BlobUploader: Send + Sync {
    async fn upload(&self, url: &str, data: &[u8]) -> Result<(), UploadError>;
}

/// Uploads with a single block blob PUT.
#[derive(Debug, Clone, Default)]
pub struct HttpBlobUploader {
    http: Client,
}

impl HttpBlobUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl BlobUploader for HttpBlobUploader {
    // The URL carries a SAS token; keep it out of spans.
    #[instrument(skip(self, url, data), fields(bytes = data.len()))]
    async fn upload(&self, url: &str, data: &[u8]) -> Result<(), UploadError> {
        let response = self
            .http
            .put(url)
            .header(BLOB_TYPE_HEADER, BLOCK_BLOB)
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Blob upload accepted");
        Ok(())
    }
}
