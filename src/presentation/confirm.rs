//! Console confirmation adapters.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::ports::ConfirmationPort;

/// Interactive y/N prompt on the terminal. Anything but an explicit
/// `y`/`yes` counts as a decline.
pub struct StdinConfirmation;

#[async_trait]
impl ConfirmationPort for StdinConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        println!("{prompt} [y/N]");

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        if reader.read_line(&mut line).await.is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Non-interactive approval, for `--yes` runs.
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPort for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
