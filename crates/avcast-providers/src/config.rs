//! Provider configuration, loaded from the environment.

use std::time::Duration;

/// Configuration for the script generation client.
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: String,
    /// Chat completion model
    pub model: String,
    /// Completion budget
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ScriptConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: std::env::var("SCRIPT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            max_tokens: std::env::var("SCRIPT_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            temperature: std::env::var("SCRIPT_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.7),
            timeout: Duration::from_secs(
                std::env::var("SCRIPT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Configuration for the direct-synthesis voice provider.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// Base URL of the API
    pub base_url: String,
    /// API key sent in the `xi-api-key` header
    pub api_key: String,
    /// Voice to synthesize with
    pub voice_id: String,
    /// Synthesis model
    pub model_id: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            voice_id: String::new(),
            model_id: "eleven_monolingual_v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ElevenLabsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ELEVEN_LABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            api_key: std::env::var("ELEVEN_LABS_API_KEY").unwrap_or_default(),
            voice_id: std::env::var("ELEVEN_LABS_VOICE_ID").unwrap_or_default(),
            model_id: std::env::var("ELEVEN_LABS_MODEL")
                .unwrap_or_else(|_| "eleven_monolingual_v1".to_string()),
            timeout: Duration::from_secs(
                std::env::var("ELEVEN_LABS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Configuration for the queued voice provider.
#[derive(Debug, Clone)]
pub struct DeepLabsConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Optional reference voice for cloning
    pub ref_audio_id: Option<String>,
    /// Timeout for the synthesis submission call. Generation starts
    /// synchronously on the provider side, so this runs long.
    pub submit_timeout: Duration,
    /// Timeout for each audio download attempt
    pub download_timeout: Duration,
    /// Maximum download attempts while the audio is being prepared
    pub poll_attempts: u32,
    /// First retry delay (doubles each attempt)
    pub poll_base_delay: Duration,
    /// Retry delay cap
    pub poll_max_delay: Duration,
}

impl Default for DeepLabsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.msganesh.com".to_string(),
            ref_audio_id: None,
            submit_timeout: Duration::from_secs(200),
            download_timeout: Duration::from_secs(30),
            poll_attempts: 10,
            poll_base_delay: Duration::from_secs(1),
            poll_max_delay: Duration::from_secs(30),
        }
    }
}

impl DeepLabsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("DEEP_LABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.msganesh.com".to_string()),
            ref_audio_id: std::env::var("DEEP_LABS_REF_VOICE_ID").ok(),
            submit_timeout: Duration::from_secs(
                std::env::var("DEEP_LABS_SUBMIT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(200),
            ),
            download_timeout: Duration::from_secs(
                std::env::var("DEEP_LABS_DOWNLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            poll_attempts: std::env::var("DEEP_LABS_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            poll_base_delay: Duration::from_secs(
                std::env::var("DEEP_LABS_POLL_BASE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1),
            ),
            poll_max_delay: Duration::from_secs(
                std::env::var("DEEP_LABS_POLL_MAX_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Configuration for the avatar render provider.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Base URL for submission and status
    pub api_base_url: String,
    /// Base URL for asset uploads
    pub upload_base_url: String,
    /// API key sent in the `x-api-key` header
    pub api_key: String,
    /// Avatar presented in the video
    pub avatar_id: String,
    /// Provider voice used when audio upload fails and the render falls
    /// back to text input
    pub fallback_voice_id: Option<String>,
    /// Submit renders in the provider's test mode
    pub test_mode: bool,
    /// Maximum status checks before giving up
    pub poll_attempts: u32,
    /// Fixed delay between status checks
    pub poll_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.heygen.com".to_string(),
            upload_base_url: "https://upload.heygen.com".to_string(),
            api_key: String::new(),
            avatar_id: String::new(),
            fallback_voice_id: None,
            test_mode: false,
            poll_attempts: 30,
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RenderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_base_url: std::env::var("HEYGEN_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.heygen.com".to_string()),
            upload_base_url: std::env::var("HEYGEN_UPLOAD_BASE_URL")
                .unwrap_or_else(|_| "https://upload.heygen.com".to_string()),
            api_key: std::env::var("HEYGEN_API_KEY").unwrap_or_default(),
            avatar_id: std::env::var("AVATAR_ID").unwrap_or_default(),
            fallback_voice_id: std::env::var("HEYGEN_VOICE_ID").ok(),
            test_mode: std::env::var("HEYGEN_TEST_MODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            poll_attempts: std::env::var("HEYGEN_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            poll_interval: Duration::from_secs(
                std::env::var("HEYGEN_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            timeout: Duration::from_secs(
                std::env::var("HEYGEN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}
