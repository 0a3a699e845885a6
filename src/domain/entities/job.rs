//! Sync job records and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a sync job.
///
/// Status is monotonic except for the explicit reset operation, which
/// force-fails any pending/running job on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Queued, not yet picked up by a worker.
    Pending,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Complete,
    /// Finished with an error, or force-failed by a queue reset.
    Failed,
}

impl JobStatus {
    /// Returns true for jobs that are still in the queue.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Returns true for jobs that have reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A background sync job as reported by the backend.
///
/// Owned by the backend; this crate only reads job records and may request
/// queue resets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    /// Job id.
    #[serde(with = "crate::domain::serde_utils::string_or_number")]
    pub id: String,
    /// Board the job synchronizes.
    #[serde(with = "crate::domain::serde_utils::string_or_number")]
    pub board_id: String,
    /// Current status.
    pub status: JobStatus,
    /// Queue insertion time.
    pub created_at: DateTime<Utc>,
    /// Completion time, set once the job reaches a terminal state.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Human-readable progress line.
    #[serde(default)]
    pub progress_message: Option<String>,
    /// Worker log lines.
    #[serde(default)]
    pub logs: Vec<String>,
    /// Arbitrary stats blob recorded by the worker.
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

impl SyncJob {
    /// Elapsed runtime of the job.
    ///
    /// Active jobs are measured against `now`; completed jobs are frozen at
    /// their completion timestamp.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        let end = self.completed_at.unwrap_or(now);
        (end - self.created_at).max(chrono::Duration::zero())
    }

    /// Formats the elapsed runtime as zero-padded `minutes:seconds`.
    #[must_use]
    pub fn format_duration(&self, now: DateTime<Utc>) -> String {
        let seconds = self.elapsed(now).num_seconds();
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}

/// An atomic snapshot of the job list, fully replacing its predecessor.
#[derive(Debug, Clone, Default)]
pub struct JobSnapshot {
    /// Jobs in the order the backend returned them.
    pub jobs: Vec<SyncJob>,
    /// Local receive time of the snapshot.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(jobs: Vec<SyncJob>) -> Self {
        Self {
            jobs,
            fetched_at: Some(Utc::now()),
        }
    }

    /// Pending and running jobs, in backend order.
    pub fn active(&self) -> impl Iterator<Item = &SyncJob> {
        self.jobs.iter().filter(|j| j.status.is_active())
    }

    /// Complete and failed jobs, in backend order.
    pub fn historical(&self) -> impl Iterator<Item = &SyncJob> {
        self.jobs.iter().filter(|j| j.status.is_terminal())
    }

    /// Returns true when any job is still pending or running.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.jobs.iter().any(|j| j.status.is_active())
    }
}
