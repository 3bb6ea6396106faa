//! Avatar video rendering.
//!
//! Drives one render job end to end: upload the narration audio (falling
//! back to the provider's own text voice if the upload is refused), submit
//! the render, poll its status on a fixed interval, and download the
//! finished video. The voice asset's temp file is deleted on every exit
//! path.

use avcast_models::{RenderJob, RenderJobStatus, VoiceAsset};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::poller::{poll, PollConfig, PollError, PollOutcome};
use crate::upload::AssetUploader;

const OUTPUT_WIDTH: u32 = 1280;
const OUTPUT_HEIGHT: u32 = 720;
const BACKGROUND_COLOR: &str = "#f6f6fc";
const AVATAR_SCALE: f32 = 1.0;
const AVATAR_STYLE: &str = "normal";

/// A finished render, downloaded into memory.
pub struct RenderedVideo {
    /// Raw video bytes
    pub bytes: Vec<u8>,
    /// Human-readable completion message
    pub message: String,
}

// Video payloads run to megabytes; log the size, not the content.
impl fmt::Debug for RenderedVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedVideo")
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .field("message", &self.message)
            .finish()
    }
}

/// Client for the avatar render provider.
pub struct RenderClient {
    http: Client,
    uploader: AssetUploader,
    config: RenderConfig,
}

#[derive(Debug, Serialize)]
struct RenderRequest {
    video_inputs: Vec<VideoInput>,
    dimension: Dimension,
    test: bool,
}

#[derive(Debug, Serialize)]
struct VideoInput {
    character: Character,
    voice: VoiceInput,
    background: Background,
}

#[derive(Debug, Serialize)]
struct Character {
    #[serde(rename = "type")]
    kind: &'static str,
    avatar_id: String,
    scale: f32,
    style: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum VoiceInput {
    Audio { audio_asset_id: String },
    Text { input_text: String, voice_id: String },
}

#[derive(Debug, Serialize)]
struct Background {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'static str,
}

#[derive(Debug, Serialize)]
struct Dimension {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    data: Option<StatusData>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusData {
    status: Option<String>,
    video_url: Option<String>,
    error: Option<serde_json::Value>,
}

fn error_detail(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

impl RenderClient {
    /// Create a new render client.
    pub fn new(config: RenderConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("avcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Network)?;

        let uploader = AssetUploader::with_client(http.clone(), config.clone());
        Ok(Self {
            http,
            uploader,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(RenderConfig::from_env())
    }

    /// Render an avatar video narrated by `voice`, consuming the asset.
    ///
    /// If the audio upload is refused, the render falls back to the
    /// provider's own text-to-speech using `script` and the configured
    /// fallback voice. The asset's temp file is removed before this
    /// returns, success or not.
    pub async fn render(
        &self,
        voice: VoiceAsset,
        script: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<RenderedVideo> {
        let asset_path = voice.path.clone();
        let result = self.render_inner(voice, script, cancel).await;

        if let Err(e) = tokio::fs::remove_file(&asset_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %asset_path.display(), error = %e, "Failed to remove voice asset file");
            }
        }

        result
    }

    async fn render_inner(
        &self,
        voice: VoiceAsset,
        script: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<RenderedVideo> {
        let mut upload_err = None;
        let asset_id = match self.uploader.upload(&voice.bytes, &voice.content_type).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Audio upload failed, falling back to text voice");
                upload_err = Some(e);
                None
            }
        };

        let voice_input = match asset_id {
            Some(handle) => VoiceInput::Audio {
                audio_asset_id: handle.0,
            },
            None => match (&self.config.fallback_voice_id, script.is_empty()) {
                (Some(voice_id), false) => VoiceInput::Text {
                    input_text: script.to_string(),
                    voice_id: voice_id.clone(),
                },
                _ => {
                    return Err(upload_err.unwrap_or_else(|| {
                        ProviderError::submission_failed(
                            "No valid audio or text input for video generation",
                        )
                    }))
                }
            },
        };

        let mut job = self.submit(voice_input).await?;
        info!(job_id = %job.job_id, "Render job submitted");

        let status_url = format!(
            "{}/v1/video_status.get?video_id={}",
            self.config.api_base_url, job.job_id
        );
        let poll_config = PollConfig::fixed(
            "avatar_render",
            self.config.poll_interval,
            self.config.poll_attempts,
        );

        let http = self.http.clone();
        let api_key = self.config.api_key.clone();
        let result = poll(&poll_config, cancel, || {
            let http = http.clone();
            let url = status_url.clone();
            let api_key = api_key.clone();
            async move { check_status(&http, &url, &api_key).await }
        })
        .await;

        match result {
            Ok(video_url) => {
                job.observe(RenderJobStatus::Completed, Some(video_url.clone()), None);
                info!(job_id = %job.job_id, "Render job completed");
                let bytes = self.download(&video_url).await?;
                Ok(RenderedVideo {
                    bytes,
                    message: "Video successfully generated".to_string(),
                })
            }
            Err(PollError::Failed { detail, .. }) => {
                job.observe(RenderJobStatus::Failed, None, Some(detail.clone()));
                Err(ProviderError::render_failed(detail))
            }
            Err(PollError::TimedOut { attempts, .. }) => Err(ProviderError::PollTimeout(attempts)),
            Err(PollError::Cancelled { .. }) => Err(ProviderError::Cancelled),
        }
    }

    /// Submit the render request and record the assigned job.
    async fn submit(&self, voice_input: VoiceInput) -> ProviderResult<RenderJob> {
        let request = RenderRequest {
            video_inputs: vec![VideoInput {
                character: Character {
                    kind: "avatar",
                    avatar_id: self.config.avatar_id.clone(),
                    scale: AVATAR_SCALE,
                    style: AVATAR_STYLE,
                },
                voice: voice_input,
                background: Background {
                    kind: "color",
                    value: BACKGROUND_COLOR,
                },
            }],
            dimension: Dimension {
                width: OUTPUT_WIDTH,
                height: OUTPUT_HEIGHT,
            },
            test: self.config.test_mode,
        };

        let url = format!("{}/v2/video/generate", self.config.api_base_url);
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::submission_failed(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let submit: SubmitResponse = response.json().await?;
        let video_id = submit
            .data
            .and_then(|d| d.video_id)
            .ok_or_else(|| ProviderError::submission_failed("No video id in response"))?;

        Ok(RenderJob::submitted(video_id))
    }

    /// Download the finished video. A job can report success while the
    /// artifact is missing; an empty body is an error here.
    async fn download(&self, url: &str) -> ProviderResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::download_failed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::download_failed(format!(
                "Download returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::download_failed(format!("Read failed: {}", e)))?;

        if bytes.is_empty() {
            return Err(ProviderError::download_failed("Downloaded video is empty"));
        }

        debug!(bytes = bytes.len(), "Video downloaded");
        Ok(bytes.to_vec())
    }
}

/// One status check against the provider.
async fn check_status(
    http: &Client,
    url: &str,
    api_key: &str,
) -> Result<PollOutcome<String>, String> {
    let response = http
        .get(url)
        .header("x-api-key", api_key)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
        return Err(format!("Status endpoint returned {}", response.status()));
    }

    let envelope: StatusEnvelope = response.json().await.map_err(|e| e.to_string())?;
    let data = envelope.data.unwrap_or_default();
    let raw_status = data.status.unwrap_or_default();

    // Unrecognized statuses mean the job is still moving through the
    // provider's pipeline.
    let status = raw_status
        .parse::<RenderJobStatus>()
        .unwrap_or(RenderJobStatus::Processing);

    match status {
        RenderJobStatus::Completed => match data.video_url {
            Some(url) => Ok(PollOutcome::Ready(url)),
            // Completed without a URL shows up briefly on some providers;
            // the next check usually carries it.
            None => Ok(PollOutcome::Pending),
        },
        RenderJobStatus::Failed | RenderJobStatus::Canceled => {
            let detail = data
                .error
                .map(error_detail)
                .unwrap_or_else(|| "Video generation failed on server".to_string());
            Ok(PollOutcome::Failed(detail))
        }
        _ => {
            debug!(status = %raw_status, "Render still in progress");
            Ok(PollOutcome::Pending)
        }
    }
}
