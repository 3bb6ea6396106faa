//! Shared data models for AvatarCast.
//!
//! This crate provides Serde-serializable types for:
//! - Session identity, input modes, and lifecycle stages
//! - Voice and render provider selection
//! - Render job status tracking
//! - Audio assets and upload handles
//! - The event/reply contract with the chat transport

pub mod asset;
pub mod event;
pub mod render;
pub mod session;

// Re-export common types
pub use asset::{AssetHandle, VoiceAsset};
pub use event::{OutboundMessage, SessionEvent, SessionReply};
pub use render::{RenderJob, RenderJobStatus, RenderStatusParseError};
pub use session::{
    InputMode, InputModeParseError, RenderProviderKind, Stage, UserId, VoiceProviderKind,
    VoiceProviderParseError,
};
