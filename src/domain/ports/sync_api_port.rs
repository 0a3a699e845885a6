//! Sync-job API port definition.

use async_trait::async_trait;

use crate::domain::entities::SyncJob;
use crate::domain::errors::ApiError;

/// Port for the backend's sync-job endpoints.
#[async_trait]
pub trait SyncApiPort: Send + Sync {
    /// Lists the most recent sync jobs, newest first, capped at `limit`.
    async fn list_jobs(&self, limit: u32) -> Result<Vec<SyncJob>, ApiError>;

    /// Force-fails all pending and running jobs.
    async fn reset_queue(&self) -> Result<(), ApiError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use tokio::sync::Mutex;

    /// Scriptable sync API mock recording call counts.
    pub struct MockSyncApi {
        jobs: Mutex<Vec<SyncJob>>,
        fail_list: Arc<AtomicBool>,
        fail_reset: Arc<AtomicBool>,
        list_calls: Arc<AtomicU64>,
        reset_calls: Arc<AtomicU64>,
    }

    impl MockSyncApi {
        /// Creates a mock serving the given job list.
        pub fn new(jobs: Vec<SyncJob>) -> Self {
            Self {
                jobs: Mutex::new(jobs),
                fail_list: Arc::new(AtomicBool::new(false)),
                fail_reset: Arc::new(AtomicBool::new(false)),
                list_calls: Arc::new(AtomicU64::new(0)),
                reset_calls: Arc::new(AtomicU64::new(0)),
            }
        }

        /// Replaces the served job list.
        pub async fn set_jobs(&self, jobs: Vec<SyncJob>) {
            *self.jobs.lock().await = jobs;
        }

        /// Makes `list_jobs` fail until reset.
        pub fn set_fail_list(&self, fail: bool) {
            self.fail_list.store(fail, Ordering::SeqCst);
        }

        /// Makes `reset_queue` fail until reset.
        pub fn set_fail_reset(&self, fail: bool) {
            self.fail_reset.store(fail, Ordering::SeqCst);
        }

        /// Number of `list_jobs` calls observed.
        pub fn list_calls(&self) -> u64 {
            self.list_calls.load(Ordering::SeqCst)
        }

        /// Number of `reset_queue` calls observed.
        pub fn reset_calls(&self) -> u64 {
            self.reset_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SyncApiPort for MockSyncApi {
        async fn list_jobs(&self, limit: u32) -> Result<Vec<SyncJob>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(ApiError::network("mock list failure"));
            }
            let jobs = self.jobs.lock().await;
            Ok(jobs.iter().take(limit as usize).cloned().collect())
        }

        async fn reset_queue(&self) -> Result<(), ApiError> {
            self.reset_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_reset.load(Ordering::SeqCst) {
                return Err(ApiError::status(500, "mock reset failure"));
            }
            let mut jobs = self.jobs.lock().await;
            for job in jobs.iter_mut() {
                if job.status.is_active() {
                    job.status = crate::domain::entities::JobStatus::Failed;
                }
            }
            Ok(())
        }
    }
}
