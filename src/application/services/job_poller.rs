//! Background job polling service.
//!
//! Periodically refreshes the sync-job snapshot from the backend and
//! publishes it over a watch channel. Polling only stays on the interval
//! cadence while it is useful: when continuous refresh is enabled, or when
//! the latest snapshot still contains active jobs. An idle queue costs no
//! requests until a manual refresh or a queue mutation wakes it up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::domain::entities::JobSnapshot;
use crate::domain::errors::ApiError;
use crate::domain::ports::SyncApiPort;

/// Polling parameters.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between cadence polls.
    pub interval: Duration,
    /// Maximum number of jobs requested per poll.
    pub job_limit: u32,
    /// Poll on every tick even when no job is active.
    pub continuous: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            job_limit: 50,
            continuous: false,
        }
    }
}

/// Commands accepted by a running poller.
#[derive(Debug)]
pub enum PollCommand {
    /// Poll now regardless of cadence state.
    Refresh,
    /// Toggle continuous refresh; enabling it polls immediately.
    SetContinuous(bool),
    /// Shut the poller down.
    Stop,
}

/// Cloneable handle to a running [`JobPoller`].
#[derive(Debug, Clone)]
pub struct JobPollerHandle {
    commands: mpsc::Sender<PollCommand>,
    snapshot_rx: watch::Receiver<JobSnapshot>,
}

impl JobPollerHandle {
    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Waits until a new snapshot is published. Returns false once the
    /// poller has shut down.
    pub async fn wait_for_update(&mut self) -> bool {
        self.snapshot_rx.changed().await.is_ok()
    }

    /// Requests an immediate poll, bypassing the cadence rule.
    pub async fn trigger_refresh(&self) {
        let _ = self.commands.send(PollCommand::Refresh).await;
    }

    /// Enables or disables continuous refresh.
    pub async fn set_continuous(&self, enabled: bool) {
        let _ = self.commands.send(PollCommand::SetContinuous(enabled)).await;
    }

    /// Stops the poller.
    pub async fn stop(&self) {
        let _ = self.commands.send(PollCommand::Stop).await;
    }
}

/// Owns the poll loop; consumed by [`JobPoller::run`].
pub struct JobPoller {
    api: Arc<dyn SyncApiPort>,
    config: PollerConfig,
    continuous: bool,
    snapshot_tx: watch::Sender<JobSnapshot>,
    commands: mpsc::Receiver<PollCommand>,
}

impl JobPoller {
    /// Creates a poller and its control handle.
    #[must_use]
    pub fn new(api: Arc<dyn SyncApiPort>, config: PollerConfig) -> (Self, JobPollerHandle) {
        let (snapshot_tx, snapshot_rx) = watch::channel(JobSnapshot::default());
        let (command_tx, command_rx) = mpsc::channel(16);
        let continuous = config.continuous;
        let poller = Self {
            api,
            config,
            continuous,
            snapshot_tx,
            commands: command_rx,
        };
        let handle = JobPollerHandle {
            commands: command_tx,
            snapshot_rx,
        };
        (poller, handle)
    }

    /// Runs the poll loop until stopped or until every handle is dropped.
    ///
    /// Polls once immediately, then on each interval tick while the cadence
    /// rule holds (continuous refresh enabled, or active jobs in the last
    /// snapshot). A failed poll keeps the previous snapshot.
    pub async fn run(mut self) {
        let _ = self.poll_once().await;

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // first tick resolves immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.continuous || self.snapshot_tx.borrow().has_active() {
                        let _ = self.poll_once().await;
                    }
                }
                command = self.commands.recv() => match command {
                    Some(PollCommand::Refresh) => {
                        let _ = self.poll_once().await;
                    }
                    Some(PollCommand::SetContinuous(enabled)) => {
                        self.continuous = enabled;
                        if enabled {
                            let _ = self.poll_once().await;
                        }
                    }
                    Some(PollCommand::Stop) | None => break,
                },
            }
        }
        debug!("Job poller stopped");
    }

    /// Polls the backend once, atomically replacing the snapshot on success.
    ///
    /// # Errors
    /// Returns the poll error for the caller's bookkeeping; the previous
    /// snapshot is retained either way.
    pub async fn poll_once(&mut self) -> Result<(), ApiError> {
        match self.api.list_jobs(self.config.job_limit).await {
            Ok(jobs) => {
                debug!(count = jobs.len(), "Job snapshot refreshed");
                let _ = self.snapshot_tx.send(JobSnapshot::new(jobs));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Job poll failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}
