//! Session orchestration for AvatarCast.
//!
//! Couples the chat-facing event stream to the provider clients: each user
//! gets one state machine walking input selection, script, voiceover, and
//! render, with temporary files removed on every exit path.

pub mod config;
pub mod error;
pub mod machine;
pub mod registry;
pub mod workspace;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use machine::{Session, SessionContext};
pub use registry::SessionRegistry;
pub use workspace::SessionWorkspace;
