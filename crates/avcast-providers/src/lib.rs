//! HTTP clients for AvatarCast's external providers.
//!
//! This crate covers the three generation services a session talks to:
//! - Script writing (OpenAI-compatible chat completions)
//! - Voice synthesis (direct ElevenLabs-style and queued Deep-Labs-style)
//! - Avatar video rendering (asset upload, submission, status polling,
//!   download)
//!
//! plus the generic bounded poller the long-running jobs share.

pub mod config;
pub mod error;
pub mod poller;
pub mod script;
pub mod upload;
pub mod video;
pub mod voice;

pub use config::{DeepLabsConfig, ElevenLabsConfig, RenderConfig, ScriptConfig};
pub use error::{ProviderError, ProviderResult};
pub use poller::{poll, PollConfig, PollError, PollOutcome};
pub use script::ScriptClient;
pub use upload::AssetUploader;
pub use video::{RenderClient, RenderedVideo};
pub use voice::VoiceSynthesizer;
