//! Provider error types.

use avcast_models::VoiceProviderKind;
use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised by the script, voice, upload, and render clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Script generation failed: {0}")]
    ScriptGeneration(String),

    #[error("Voice generation failed ({provider}): {detail}")]
    VoiceGeneration {
        provider: VoiceProviderKind,
        detail: String,
    },

    #[error("Voice generation timed out ({provider}) after {attempts} attempts")]
    VoiceTimeout {
        provider: VoiceProviderKind,
        attempts: u32,
    },

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Asset upload failed: {0}")]
    Upload(String),

    #[error("Render submission failed: {0}")]
    Submission(String),

    #[error("Render polling timed out after {0} attempts")]
    PollTimeout(u32),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Video download failed: {0}")]
    Download(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn script_generation(msg: impl Into<String>) -> Self {
        Self::ScriptGeneration(msg.into())
    }

    pub fn voice_generation(provider: VoiceProviderKind, detail: impl Into<String>) -> Self {
        Self::VoiceGeneration {
            provider,
            detail: detail.into(),
        }
    }

    pub fn invalid_asset(msg: impl Into<String>) -> Self {
        Self::InvalidAsset(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn submission_failed(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// True when a polling budget ran out, as opposed to a
    /// provider-reported failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ProviderError::VoiceTimeout { .. } | ProviderError::PollTimeout(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }

    /// One-line text suitable for showing to the chat user. Full detail
    /// stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::ScriptGeneration(_) => "Could not generate a script from your input.",
            ProviderError::VoiceGeneration { .. } => "Voice generation failed.",
            ProviderError::VoiceTimeout { .. } => "Voice generation timed out. Please try again.",
            ProviderError::InvalidAsset(_) => "The audio asset is invalid.",
            ProviderError::Upload(_) => "Could not upload your audio.",
            ProviderError::Submission(_) => "The video could not be submitted for rendering.",
            ProviderError::PollTimeout(_) => "Video generation timed out.",
            ProviderError::RenderFailed(_) => "Video generation failed on the provider side.",
            ProviderError::Download(_) => "The finished video could not be downloaded.",
            ProviderError::Cancelled => "Operation cancelled.",
            ProviderError::Network(_) => "A network error occurred. Please try again.",
            ProviderError::Json(_) => "The provider sent an unreadable response.",
            ProviderError::Io(_) => "A local file error occurred.",
        }
    }
}
