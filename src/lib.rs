//! Boardlens - board asset resolution and sync-job watching.
//!
//! This crate resolves item attachments from a board-sync backend into their
//! best displayable source, caches proxied binary fetches, and watches the
//! backend's background job queue.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing console rendering and prompts.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "boardlens";
