//! Per-session scratch directories for audio and video artifacts.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::SessionResult;

/// Scratch directory holding one session's temporary files.
///
/// Created under the configured work dir with a uuid name and removed in
/// full when the session terminates, whatever the outcome.
#[derive(Debug, Clone)]
pub struct SessionWorkspace {
    root: PathBuf,
}

impl SessionWorkspace {
    /// Create a fresh workspace directory under `base`.
    pub async fn create(base: &Path) -> SessionResult<Self> {
        let root = base.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&root).await?;
        debug!(path = %root.display(), "Created session workspace");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist voiceover bytes, returning the file path.
    pub async fn write_voice(&self, bytes: &[u8], extension: &str) -> SessionResult<PathBuf> {
        let path = self
            .root
            .join(format!("voice_{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Persist rendered video bytes, returning the file path.
    pub async fn write_video(&self, bytes: &[u8]) -> SessionResult<PathBuf> {
        let path = self.root.join(format!("video_{}.mp4", Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Remove the workspace and everything in it. Safe to call more than
    /// once.
    pub async fn cleanup(&self) {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!(path = %self.root.display(), "Removed session workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.root.display(), "Failed to remove session workspace: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_write_and_cleanup() {
        let base = tempfile::tempdir().expect("tempdir");
        let workspace = SessionWorkspace::create(base.path())
            .await
            .expect("create workspace");

        let voice = workspace
            .write_voice(b"audio", "mp3")
            .await
            .expect("write voice");
        let video = workspace.write_video(b"video").await.expect("write video");
        assert!(voice.exists());
        assert!(video.exists());

        workspace.cleanup().await;
        assert!(!workspace.root().exists());
        // A second cleanup is a no-op.
        workspace.cleanup().await;
    }
}
