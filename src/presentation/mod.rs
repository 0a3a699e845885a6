//! Presentation layer for console output and prompts.

/// Console confirmation adapters.
pub mod confirm;
/// Plain-text rendering.
pub mod console;

pub use confirm::{AutoConfirm, StdinConfirmation};
pub use console::{render_assets, render_snapshot};
