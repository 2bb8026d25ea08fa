use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::entities::user::ImageRef;
use crate::error::{AppError, AppResult};

/// Remote media host boundary. Handlers go through this trait so the HTTP
/// client never leaks into request logic.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a staged local file into the given remote folder.
    async fn upload(&self, file_path: &Path, folder: &str) -> AppResult<ImageRef>;

    /// Destroy a previously uploaded image by its remote identifier.
    async fn delete(&self, public_id: &str) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Production implementation speaking the media host's upload/destroy API.
pub struct HttpMediaStore {
    client: reqwest::Client,
    api_url: String,
    cloud_name: String,
    api_key: String,
}

impl HttpMediaStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.media_api_url.clone(),
            cloud_name: config.media_cloud_name.clone(),
            api_key: config.media_api_key.clone(),
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    async fn upload(&self, file_path: &Path, folder: &str) -> AppResult<ImageRef> {
        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            AppError::Internal(format!("Failed to read upload {}: {}", file_path.display(), e))
        })?;

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .text("folder", folder.to_string())
            .text("api_key", self.api_key.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let url = format!("{}/v1_1/{}/image/upload", self.api_url, self.cloud_name);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Media upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Media host returned {} for upload",
                response.status()
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid media host response: {}", e)))?;

        Ok(ImageRef {
            secure_url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", self.api_key.clone());

        let url = format!("{}/v1_1/{}/image/destroy", self.api_url, self.cloud_name);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Media delete failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Media host returned {} for destroy",
                response.status()
            )));
        }

        Ok(())
    }
}
