//! Destructive-action confirmation port.

use async_trait::async_trait;

/// Port for asking the user to confirm a destructive action.
#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    /// Returns true when the user approved the action described by `prompt`.
    async fn confirm(&self, prompt: &str) -> bool;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Confirmation mock with a fixed answer.
    pub struct MockConfirmation {
        answer: AtomicBool,
        asks: AtomicU64,
    }

    impl MockConfirmation {
        /// Creates a mock answering `answer` to every prompt.
        pub fn new(answer: bool) -> Self {
            Self {
                answer: AtomicBool::new(answer),
                asks: AtomicU64::new(0),
            }
        }

        /// Number of prompts observed.
        pub fn asks(&self) -> u64 {
            self.asks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConfirmationPort for MockConfirmation {
        async fn confirm(&self, _prompt: &str) -> bool {
            self.asks.fetch_add(1, Ordering::SeqCst);
            self.answer.load(Ordering::SeqCst)
        }
    }
}
