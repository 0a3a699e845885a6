//! Queue reset use case.
//!
//! Force-fails every pending and running sync job on the backend. The
//! operation is destructive and always goes through the confirmation port
//! first; a successful reset triggers an immediate snapshot refresh so the
//! caller sees the force-failed jobs without waiting for the next poll.

use std::sync::Arc;

use tracing::info;

use crate::application::services::JobPollerHandle;
use crate::domain::errors::ApiError;
use crate::domain::ports::{ConfirmationPort, SyncApiPort};

const RESET_PROMPT: &str =
    "Reset the sync queue? All pending and running jobs will be marked failed.";

/// Outcome of a reset attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The queue was reset.
    Reset,
    /// The user declined the confirmation prompt.
    Cancelled,
}

/// Confirms and executes a sync-queue reset.
pub struct ResetQueueUseCase {
    api: Arc<dyn SyncApiPort>,
    confirmation: Arc<dyn ConfirmationPort>,
    poller: Option<JobPollerHandle>,
}

impl ResetQueueUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(api: Arc<dyn SyncApiPort>, confirmation: Arc<dyn ConfirmationPort>) -> Self {
        Self {
            api,
            confirmation,
            poller: None,
        }
    }

    /// Refreshes this poller after a successful reset.
    #[must_use]
    pub fn with_poller(mut self, poller: JobPollerHandle) -> Self {
        self.poller = Some(poller);
        self
    }

    /// Asks for confirmation, then resets the queue.
    pub async fn execute(&self) -> Result<ResetOutcome, ApiError> {
        if !self.confirmation.confirm(RESET_PROMPT).await {
            info!("Queue reset cancelled by user");
            return Ok(ResetOutcome::Cancelled);
        }

        self.api.reset_queue().await?;
        info!("Sync queue reset; active jobs force-failed");

        if let Some(poller) = &self.poller {
            poller.trigger_refresh().await;
        }
        Ok(ResetOutcome::Reset)
    }
}
