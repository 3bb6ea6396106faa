//! Inbound events and outbound replies exchanged with the chat transport.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{InputMode, UserId, VoiceProviderKind};

/// One user action delivered by the chat transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// User picked how they will supply content
    InputModeSelected { user: UserId, mode: InputMode },

    /// User sent the raw content for the chosen mode. For voice notes the
    /// transport transcribes first; content always arrives as text.
    ContentSubmitted { user: UserId, content: String },

    /// User picked a voice provider for narration
    VoiceProviderSelected {
        user: UserId,
        provider: VoiceProviderKind,
    },

    /// User confirmed the voiceover, requesting the render
    VideoConfirmed { user: UserId },

    /// User aborted the session
    Cancelled { user: UserId },
}

impl SessionEvent {
    /// The user this event belongs to.
    pub fn user(&self) -> &UserId {
        match self {
            SessionEvent::InputModeSelected { user, .. } => user,
            SessionEvent::ContentSubmitted { user, .. } => user,
            SessionEvent::VoiceProviderSelected { user, .. } => user,
            SessionEvent::VideoConfirmed { user } => user,
            SessionEvent::Cancelled { user } => user,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::InputModeSelected { .. } => "input_mode_selected",
            SessionEvent::ContentSubmitted { .. } => "content_submitted",
            SessionEvent::VoiceProviderSelected { .. } => "voice_provider_selected",
            SessionEvent::VideoConfirmed { .. } => "video_confirmed",
            SessionEvent::Cancelled { .. } => "cancelled",
        }
    }
}

/// A message pushed back to the chat transport.
#[derive(Clone)]
pub enum SessionReply {
    /// Instructional text asking for the next user action
    Prompt { text: String },

    /// Progress line for a long-running phase
    Status { text: String },

    /// The generated (or verbatim) script, for user review
    ScriptPreview { script: String },

    /// Synthesized voiceover audio
    Audio { bytes: Vec<u8>, caption: String },

    /// The rendered video
    Video { bytes: Vec<u8>, caption: String },

    /// Readable failure report
    Error { text: String },
}

impl SessionReply {
    /// Create a prompt reply.
    pub fn prompt(text: impl Into<String>) -> Self {
        SessionReply::Prompt { text: text.into() }
    }

    /// Create a progress status reply.
    pub fn status(text: impl Into<String>) -> Self {
        SessionReply::Status { text: text.into() }
    }

    /// Create a script preview reply.
    pub fn script_preview(script: impl Into<String>) -> Self {
        SessionReply::ScriptPreview {
            script: script.into(),
        }
    }

    /// Create an error reply.
    pub fn error(text: impl Into<String>) -> Self {
        SessionReply::Error { text: text.into() }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionReply::Prompt { .. } => "prompt",
            SessionReply::Status { .. } => "status",
            SessionReply::ScriptPreview { .. } => "script_preview",
            SessionReply::Audio { .. } => "audio",
            SessionReply::Video { .. } => "video",
            SessionReply::Error { .. } => "error",
        }
    }
}

// Media payloads run to megabytes; log sizes, not content.
impl fmt::Debug for SessionReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionReply::Prompt { text } => f.debug_struct("Prompt").field("text", text).finish(),
            SessionReply::Status { text } => f.debug_struct("Status").field("text", text).finish(),
            SessionReply::ScriptPreview { script } => f
                .debug_struct("ScriptPreview")
                .field("script", script)
                .finish(),
            SessionReply::Audio { bytes, caption } => f
                .debug_struct("Audio")
                .field("bytes", &format_args!("{} bytes", bytes.len()))
                .field("caption", caption)
                .finish(),
            SessionReply::Video { bytes, caption } => f
                .debug_struct("Video")
                .field("bytes", &format_args!("{} bytes", bytes.len()))
                .field("caption", caption)
                .finish(),
            SessionReply::Error { text } => f.debug_struct("Error").field("text", text).finish(),
        }
    }
}

/// Envelope routing a reply to its user.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub user: UserId,
    pub reply: SessionReply,
}

impl OutboundMessage {
    pub fn new(user: UserId, reply: SessionReply) -> Self {
        Self { user, reply }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::InputModeSelected {
            user: UserId::new("u1"),
            mode: InputMode::DirectText,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"input_mode_selected\""));
        assert!(json.contains("\"mode\":\"direct_text\""));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"voice_provider_selected","user":"42","provider":"deep_labs"}"#;
        let event: SessionEvent = serde_json::from_str(json).unwrap();
        match event {
            SessionEvent::VoiceProviderSelected { user, provider } => {
                assert_eq!(user.as_str(), "42");
                assert_eq!(provider, VoiceProviderKind::DeepLabs);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_user_accessor() {
        let event = SessionEvent::Cancelled {
            user: UserId::new("u9"),
        };
        assert_eq!(event.user().as_str(), "u9");
        assert_eq!(event.kind(), "cancelled");
    }

    #[test]
    fn test_reply_debug_elides_media() {
        let reply = SessionReply::Video {
            bytes: vec![0u8; 50_000],
            caption: "done".to_string(),
        };
        let rendered = format!("{:?}", reply);
        assert!(rendered.contains("50000 bytes"));
    }
}
