//! Render job state reported by the avatar provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Remote render job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderJobStatus {
    /// Accepted, not yet picked up
    #[default]
    #[serde(alias = "pending", alias = "waiting")]
    Queued,
    /// Being rendered
    Processing,
    /// Finished, result URL available
    Completed,
    /// Provider-reported failure
    Failed,
    /// Canceled on the provider side
    Canceled,
}

impl RenderJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderJobStatus::Queued => "queued",
            RenderJobStatus::Processing => "processing",
            RenderJobStatus::Completed => "completed",
            RenderJobStatus::Failed => "failed",
            RenderJobStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RenderJobStatus::Completed | RenderJobStatus::Failed | RenderJobStatus::Canceled
        )
    }
}

impl fmt::Display for RenderJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RenderJobStatus {
    type Err = RenderStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" | "pending" | "waiting" => Ok(RenderJobStatus::Queued),
            "processing" => Ok(RenderJobStatus::Processing),
            "completed" => Ok(RenderJobStatus::Completed),
            "failed" => Ok(RenderJobStatus::Failed),
            "canceled" | "cancelled" => Ok(RenderJobStatus::Canceled),
            _ => Err(RenderStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown render status: {0}")]
pub struct RenderStatusParseError(String);

/// One in-flight video generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    /// Provider-assigned job id
    pub job_id: String,

    /// Last observed status
    pub status: RenderJobStatus,

    /// Download URL, set once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    /// Provider-reported failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,

    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
}

impl RenderJob {
    /// Record a freshly accepted submission.
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: RenderJobStatus::Queued,
            result_url: None,
            error_detail: None,
            submitted_at: Utc::now(),
        }
    }

    /// Fold a status report into the job. Fields absent from a report do
    /// not clear values observed earlier.
    pub fn observe(
        &mut self,
        status: RenderJobStatus,
        result_url: Option<String>,
        error_detail: Option<String>,
    ) {
        self.status = status;
        if result_url.is_some() {
            self.result_url = result_url;
        }
        if error_detail.is_some() {
            self.error_detail = error_detail;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_aliases() {
        assert_eq!(
            "pending".parse::<RenderJobStatus>().unwrap(),
            RenderJobStatus::Queued
        );
        assert_eq!(
            "waiting".parse::<RenderJobStatus>().unwrap(),
            RenderJobStatus::Queued
        );
        assert_eq!(
            "cancelled".parse::<RenderJobStatus>().unwrap(),
            RenderJobStatus::Canceled
        );
        assert!("exploded".parse::<RenderJobStatus>().is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(RenderJobStatus::Completed.is_terminal());
        assert!(RenderJobStatus::Failed.is_terminal());
        assert!(RenderJobStatus::Canceled.is_terminal());
        assert!(!RenderJobStatus::Processing.is_terminal());
        assert!(!RenderJobStatus::Queued.is_terminal());
    }

    #[test]
    fn test_job_observe_keeps_earlier_fields() {
        let mut job = RenderJob::submitted("vid-1");
        assert_eq!(job.status, RenderJobStatus::Queued);

        job.observe(
            RenderJobStatus::Completed,
            Some("https://cdn.example/video.mp4".to_string()),
            None,
        );
        job.observe(RenderJobStatus::Completed, None, None);
        assert_eq!(
            job.result_url.as_deref(),
            Some("https://cdn.example/video.mp4")
        );
    }
}
