//! Script generation client.
//!
//! One blocking chat-completion call against an OpenAI-compatible API turns
//! the user's raw content into a narration-ready script. Degenerate outputs
//! are rejected; there is no retry beyond what the provider does itself.

use avcast_models::InputMode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ScriptConfig;
use crate::error::{ProviderError, ProviderResult};

/// Outputs shorter than this are treated as a failed generation.
const MIN_SCRIPT_LEN: usize = 50;

const SYSTEM_PROMPT: &str = "You are a professional script writer. Generate clear, concise, and engaging scripts \
that are suitable for video narration. Focus on:\n\
- Clarity of message\n\
- Conversational tone\n\
- Appropriate length (1-2 paragraphs)\n\
- Engaging narrative structure\n\
MOST IMPORTANTLY: Generate the script in the same language and style as the input, \
and make sure the output text is formatted so it reads well when converted to voice.";

/// Chat-completions client for script generation.
pub struct ScriptClient {
    http: Client,
    config: ScriptConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ScriptClient {
    /// Create a new script client.
    pub fn new(config: ScriptConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("avcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ScriptConfig::from_env())
    }

    /// Generate a script from the user's content.
    ///
    /// The input mode picks the instruction prefixed to the content; modes
    /// that use content verbatim never reach this call.
    pub async fn generate(&self, content: &str, mode: InputMode) -> ProviderResult<String> {
        let user_message = match mode.script_prefix() {
            Some(prefix) => format!("{} {}", prefix, content),
            None => content.to_string(),
        };

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.config.base_url);
        debug!(mode = %mode, "Requesting script generation");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::script_generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::script_generation(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::script_generation(format!("Invalid response: {}", e)))?;

        let script = chat
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::script_generation("No choices in response"))?;

        if script.len() < MIN_SCRIPT_LEN {
            return Err(ProviderError::script_generation(
                "Generated script is too short",
            ));
        }

        info!(mode = %mode, chars = script.len(), "Script generated");
        Ok(script)
    }
}
