//! Progress records for long-running website/video recipe extraction.
//!
//! Jobs are created and driven by an external extraction service; this
//! module only models the pushed status and the rules for applying updates.

use serde::{Deserialize, Serialize};

use crate::{LarderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Analyzing,
    Validating,
    Saving,
    Completed,
    Failed,
}

impl JobState {
    /// `Completed` and `Failed` accept no further updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Status of one extraction job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub status: JobState,
    /// 0-100.
    pub progress: u8,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A pushed status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    pub status: JobState,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl JobStatus {
    /// A freshly started job.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Analyzing,
            progress: 0,
            message: String::new(),
            data: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a pushed update.
    ///
    /// Progress is clamped to 100 and forced to 100 on completion. Updates to
    /// a job already in a terminal state are rejected.
    pub fn apply(&mut self, update: JobUpdate) -> Result<()> {
        if self.is_terminal() {
            return Err(LarderError::InvalidInput(format!(
                "job {} already {:?}",
                self.job_id, self.status
            )));
        }

        self.status = update.status;
        if let Some(progress) = update.progress {
            self.progress = progress.min(100) as u8;
        }
        if update.status == JobState::Completed {
            self.progress = 100;
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if update.data.is_some() {
            self.data = update.data;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(status: JobState, progress: Option<u32>) -> JobUpdate {
        JobUpdate {
            status,
            progress,
            message: None,
            data: None,
        }
    }

    #[test]
    fn progress_is_clamped() {
        let mut job = JobStatus::new("j1");
        job.apply(update(JobState::Validating, Some(250))).unwrap();
        assert_eq!(job.progress, 100);
        assert_eq!(job.status, JobState::Validating);
    }

    #[test]
    fn completion_forces_full_progress() {
        let mut job = JobStatus::new("j1");
        job.apply(update(JobState::Saving, Some(80))).unwrap();
        job.apply(update(JobState::Completed, None)).unwrap();
        assert_eq!(job.progress, 100);
        assert!(job.is_terminal());
    }

    #[test]
    fn terminal_jobs_reject_updates() {
        let mut job = JobStatus::new("j1");
        job.apply(update(JobState::Failed, None)).unwrap();
        let err = job.apply(update(JobState::Analyzing, Some(10))).unwrap_err();
        assert!(matches!(err, LarderError::InvalidInput(_)));
        assert_eq!(job.status, JobState::Failed);
    }

    #[test]
    fn deserialises_pushed_payload() {
        let job: JobStatus = serde_json::from_str(
            r#"{"job_id":"abc","status":"analyzing","progress":15,"message":"Reading page"}"#,
        )
        .unwrap();
        assert_eq!(job.status, JobState::Analyzing);
        assert_eq!(job.progress, 15);
        assert!(job.data.is_none());
    }
}
