//! Session layer configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Session layer configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base directory for per-session workspaces
    pub work_dir: PathBuf,
    /// Outbound reply channel capacity
    pub outbound_capacity: usize,
    /// How long a session may sit in an awaiting stage before the sweeper
    /// removes it
    pub idle_timeout: Duration,
    /// Interval between idle sweeps
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("avcast"),
            outbound_capacity: 64,
            idle_timeout: Duration::from_secs(1800),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("AVCAST_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("avcast")),
            outbound_capacity: std::env::var("AVCAST_OUTBOUND_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64),
            idle_timeout: Duration::from_secs(
                std::env::var("AVCAST_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1800),
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("AVCAST_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }
}
