//! Binary asset upload to the render provider.

use avcast_models::AssetHandle;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::RenderConfig;
use crate::error::{ProviderError, ProviderResult};

/// Uploads local audio bytes and returns the provider's asset handle.
pub struct AssetUploader {
    http: Client,
    config: RenderConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    id: Option<String>,
}

impl AssetUploader {
    /// Create a new uploader.
    pub fn new(config: RenderConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("avcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self::with_client(http, config))
    }

    /// Create an uploader sharing an existing HTTP client.
    pub(crate) fn with_client(http: Client, config: RenderConfig) -> Self {
        Self { http, config }
    }

    /// Upload `bytes` and return the handle the provider assigned.
    ///
    /// Empty input fails before any network call is made.
    pub async fn upload(&self, bytes: &[u8], content_type: &str) -> ProviderResult<AssetHandle> {
        if bytes.is_empty() {
            return Err(ProviderError::invalid_asset("Asset is empty"));
        }

        let url = format!("{}/v1/asset", self.config.upload_base_url);
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::upload_failed(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let upload: UploadResponse = response.json().await?;
        let id = upload
            .data
            .and_then(|d| d.id)
            .ok_or_else(|| ProviderError::upload_failed("No asset id in upload response"))?;

        info!(asset_id = %id, bytes = bytes.len(), "Asset uploaded");
        Ok(AssetHandle::from_string(id))
    }
}
