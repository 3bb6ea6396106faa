//! Session errors.

use avcast_models::Stage;
use avcast_providers::ProviderError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The event is not valid in the session's current stage. The session
    /// survives; the user is told to start over.
    #[error("Event not valid in stage {stage}")]
    OutOfSequence { stage: Stage },

    /// A provider call failed. Terminal for the session.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    pub fn out_of_sequence(stage: Stage) -> Self {
        Self::OutOfSequence { stage }
    }

    /// True when the session should survive the error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::OutOfSequence { .. })
    }

    /// One-line text suitable for showing to the chat user. Full detail
    /// stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::OutOfSequence { .. } => "Please start a new session first.",
            SessionError::Provider(e) => e.user_message(),
            SessionError::Io(_) => "A local file error occurred.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_sequence_display_names_stage() {
        let err = SessionError::out_of_sequence(Stage::AwaitingVideoConfirm);
        assert!(err.to_string().contains("awaiting_video_confirm"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_provider_errors_are_terminal() {
        let err = SessionError::from(ProviderError::render_failed("out of credits"));
        assert!(!err.is_recoverable());
        assert_eq!(err.user_message(), "Video generation failed on the provider side.");
    }
}
