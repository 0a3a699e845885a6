//! Infrastructure layer with external service adapters.

/// Backend API client.
pub mod api;
/// Application configuration.
pub mod config;

pub use api::BoardApiClient;
pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
