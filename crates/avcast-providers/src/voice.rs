//! Voice synthesis over two provider styles.
//!
//! ElevenLabs answers one POST with the finished audio. Deep Labs queues a
//! job and serves the audio from a download URL once it exists, so that
//! path runs through the generic poller with exponential backoff.

use avcast_models::VoiceProviderKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{DeepLabsConfig, ElevenLabsConfig};
use crate::error::{ProviderError, ProviderResult};
use crate::poller::{poll, PollConfig, PollError, PollOutcome};

/// Synthesizes narration audio with the provider the user picked.
pub struct VoiceSynthesizer {
    http: Client,
    eleven: ElevenLabsConfig,
    deep: DeepLabsConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.8,
            style: 0.2,
            speaker_boost: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct QueuedSynthesisRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_audio_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueuedSynthesisResponse {
    id: Option<String>,
}

impl VoiceSynthesizer {
    /// Create a new synthesizer.
    pub fn new(eleven: ElevenLabsConfig, deep: DeepLabsConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("avcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, eleven, deep })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ElevenLabsConfig::from_env(), DeepLabsConfig::from_env())
    }

    /// Synthesize `text` with the given provider.
    ///
    /// Returns complete audio bytes or an error; an empty body is never
    /// treated as success.
    pub async fn synthesize(
        &self,
        text: &str,
        provider: VoiceProviderKind,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<u8>> {
        info!(provider = %provider, chars = text.len(), "Synthesizing voice");
        match provider {
            VoiceProviderKind::ElevenLabs => self.synthesize_direct(text).await,
            VoiceProviderKind::DeepLabs => self.synthesize_queued(text, cancel).await,
        }
    }

    /// One blocking request returning the finished audio.
    async fn synthesize_direct(&self, text: &str) -> ProviderResult<Vec<u8>> {
        let provider = VoiceProviderKind::ElevenLabs;
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.eleven.base_url, self.eleven.voice_id
        );

        let request = SynthesisRequest {
            text: text.to_string(),
            model_id: self.eleven.model_id.clone(),
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.eleven.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .timeout(self.eleven.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::voice_generation(
                provider,
                format!("API returned {}: {}", status, body),
            ));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderError::voice_generation(
                provider,
                "Provider returned empty audio",
            ));
        }

        debug!(bytes = bytes.len(), "Direct synthesis complete");
        Ok(bytes.to_vec())
    }

    /// Submit a synthesis job, then poll its download URL until the audio
    /// exists.
    async fn synthesize_queued(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> ProviderResult<Vec<u8>> {
        let provider = VoiceProviderKind::DeepLabs;
        let submit_url = format!("{}/itts/generate_speech", self.deep.base_url);

        let request = QueuedSynthesisRequest {
            text: text.to_string(),
            ref_audio_id: self.deep.ref_audio_id.clone(),
        };

        let response = self
            .http
            .post(&submit_url)
            .timeout(self.deep.submit_timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::voice_generation(
                provider,
                format!("API returned {}: {}", status, body),
            ));
        }

        let submitted: QueuedSynthesisResponse = response.json().await?;
        let audio_id = submitted.id.ok_or_else(|| {
            ProviderError::voice_generation(provider, "No audio id received from provider")
        })?;

        debug!(audio_id = %audio_id, "Synthesis job submitted, polling for audio");

        let download_url = format!("{}/itts/{}.wav", self.deep.base_url, audio_id);
        let poll_config = PollConfig::new("voice_synthesis")
            .with_max_attempts(self.deep.poll_attempts)
            .with_base_delay(self.deep.poll_base_delay)
            .with_max_delay(self.deep.poll_max_delay);

        let http = self.http.clone();
        let download_timeout = self.deep.download_timeout;
        let result = poll(&poll_config, cancel, || {
            let http = http.clone();
            let url = download_url.clone();
            async move {
                let response = http
                    .get(&url)
                    .timeout(download_timeout)
                    .send()
                    .await
                    .map_err(|e| e.to_string())?;
                if !response.status().is_success() {
                    return Ok::<_, String>(PollOutcome::Pending);
                }
                let bytes = response.bytes().await.map_err(|e| e.to_string())?;
                if bytes.is_empty() {
                    return Ok(PollOutcome::Pending);
                }
                Ok(PollOutcome::Ready(bytes.to_vec()))
            }
        })
        .await;

        match result {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Queued synthesis complete");
                Ok(bytes)
            }
            Err(PollError::TimedOut { attempts, .. }) => {
                Err(ProviderError::VoiceTimeout { provider, attempts })
            }
            Err(PollError::Failed { detail, .. }) => {
                Err(ProviderError::voice_generation(provider, detail))
            }
            Err(PollError::Cancelled { .. }) => Err(ProviderError::Cancelled),
        }
    }
}
