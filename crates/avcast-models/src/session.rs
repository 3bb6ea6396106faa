//! Session identity, input modes, stages, and provider selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stable identity of a chat user, as supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How the user supplies the raw material for a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Verbatim script text, used as-is
    DirectText,
    /// Topic plus bullet points, expanded into a script
    TopicOutline,
    /// Transcribed voice note, rewritten into a script
    VoiceNote,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::DirectText => "direct_text",
            InputMode::TopicOutline => "topic_outline",
            InputMode::VoiceNote => "voice_note",
        }
    }

    /// Instruction shown to the user after this mode is selected.
    pub fn prompt(&self) -> &'static str {
        match self {
            InputMode::DirectText => "\u{270d}\u{fe0f} Please send your full script text (1-2 paragraphs):",
            InputMode::TopicOutline => {
                "\u{1f4cc} Send your topic followed by bullet points:\nExample:\n'Digital Marketing\n- SEO Importance\n- Social Media Strategies'"
            }
            InputMode::VoiceNote => "\u{1f399}\u{fe0f} Send a voice note describing your idea:",
        }
    }

    /// Instruction prefixed to the user content when asking the script
    /// writer to rework it. `None` for modes that use the content verbatim.
    pub fn script_prefix(&self) -> Option<&'static str> {
        match self {
            InputMode::DirectText => None,
            InputMode::TopicOutline => Some("Convert this video idea into a compelling script:"),
            InputMode::VoiceNote => Some("Transform this voice idea into a structured script:"),
        }
    }

    /// Whether content in this mode goes through script generation.
    pub fn requires_script_generation(&self) -> bool {
        self.script_prefix().is_some()
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = InputModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct_text" => Ok(InputMode::DirectText),
            "topic_outline" => Ok(InputMode::TopicOutline),
            "voice_note" => Ok(InputMode::VoiceNote),
            _ => Err(InputModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown input mode: {0}")]
pub struct InputModeParseError(String);

/// Where a session currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for the user to pick an input mode
    #[default]
    AwaitingInputMode,
    /// Waiting for the raw content of the chosen mode
    AwaitingContent,
    /// Script generation call in flight
    GeneratingScript,
    /// Waiting for the user to pick a voice provider
    AwaitingVoiceProvider,
    /// Voice synthesis in flight
    GeneratingVoice,
    /// Voiceover delivered, waiting for render confirmation
    AwaitingVideoConfirm,
    /// Render job in flight
    GeneratingVideo,
    /// Video delivered, session complete
    Delivered,
    /// Unrecoverable failure reported
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::AwaitingInputMode => "awaiting_input_mode",
            Stage::AwaitingContent => "awaiting_content",
            Stage::GeneratingScript => "generating_script",
            Stage::AwaitingVoiceProvider => "awaiting_voice_provider",
            Stage::GeneratingVoice => "generating_voice",
            Stage::AwaitingVideoConfirm => "awaiting_video_confirm",
            Stage::GeneratingVideo => "generating_video",
            Stage::Delivered => "delivered",
            Stage::Failed => "failed",
        }
    }

    /// Terminal stages end the session; no further events are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Delivered | Stage::Failed)
    }

    /// Busy stages have an external call in flight and gate out new input.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Stage::GeneratingScript | Stage::GeneratingVoice | Stage::GeneratingVideo
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported voice synthesis providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceProviderKind {
    /// Direct synthesis: one request returns the audio bytes
    ElevenLabs,
    /// Queued synthesis: submit a job, then poll for the audio
    DeepLabs,
}

impl VoiceProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceProviderKind::ElevenLabs => "eleven_labs",
            VoiceProviderKind::DeepLabs => "deep_labs",
        }
    }

    /// MIME type of the audio this provider returns.
    pub fn content_type(&self) -> &'static str {
        match self {
            VoiceProviderKind::ElevenLabs => "audio/mpeg",
            VoiceProviderKind::DeepLabs => "audio/x-wav",
        }
    }

    /// File extension matching [`Self::content_type`].
    pub fn file_extension(&self) -> &'static str {
        match self {
            VoiceProviderKind::ElevenLabs => "mp3",
            VoiceProviderKind::DeepLabs => "wav",
        }
    }
}

impl fmt::Display for VoiceProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VoiceProviderKind {
    type Err = VoiceProviderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eleven_labs" => Ok(VoiceProviderKind::ElevenLabs),
            "deep_labs" => Ok(VoiceProviderKind::DeepLabs),
            _ => Err(VoiceProviderParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unsupported voice provider: {0}")]
pub struct VoiceProviderParseError(String);

/// Supported avatar render providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RenderProviderKind {
    /// HeyGen v2 avatar renderer
    #[default]
    #[serde(rename = "heygen")]
    HeyGen,
}

impl RenderProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderProviderKind::HeyGen => "heygen",
        }
    }
}

impl fmt::Display for RenderProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
