//! Audio assets produced by voice synthesis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque id returned by the render provider after accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(pub String);

impl AssetHandle {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Synthesized narration audio, held in memory and mirrored to a temp file.
///
/// Owned by the session that produced it until handed to the render client,
/// which consumes it by value and removes the backing file. The session
/// workspace teardown removes anything left behind.
#[derive(Clone)]
pub struct VoiceAsset {
    /// Raw audio bytes
    pub bytes: Vec<u8>,
    /// Temp file the bytes were persisted to
    pub path: PathBuf,
    /// MIME type matching the producing provider
    pub content_type: String,
}

impl VoiceAsset {
    pub fn new(bytes: Vec<u8>, path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            path: path.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Audio payloads run to megabytes; log the size, not the content.
impl fmt::Debug for VoiceAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceAsset")
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .field("path", &self.path)
            .field("content_type", &self.content_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_asset_debug_elides_bytes() {
        let asset = VoiceAsset::new(vec![0u8; 9000], "/tmp/voice.mp3", "audio/mpeg");
        let rendered = format!("{:?}", asset);
        assert!(rendered.contains("9000 bytes"));
        assert!(!rendered.contains("[0"));
    }

    #[test]
    fn test_asset_handle_display() {
        let handle = AssetHandle::from_string("asset-42");
        assert_eq!(handle.to_string(), "asset-42");
        assert_eq!(handle.as_str(), "asset-42");
    }
}
