//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

const APP_NAME: &str = "boardlens";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "tecknian";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration merged from file, environment and CLI.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Bearer credential for the backend. Never persisted; supplied via
    /// environment or CLI only.
    #[serde(skip)]
    pub token: Option<String>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Backend API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upstream provider tag used in gateway URLs.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Seconds between job polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum number of jobs requested per poll.
    #[serde(default = "default_job_limit")]
    pub job_limit: u32,

    /// Request width-limited optimized renditions.
    #[serde(default = "default_true")]
    pub optimize_images: bool,

    /// Optimized rendition target width in pixels.
    #[serde(default = "default_thumb_width")]
    pub thumb_width: u32,

    /// Show the local/remote origin indicator on resolved assets.
    #[serde(default)]
    pub debug_overlay: bool,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_provider() -> String {
    "monday".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_job_limit() -> u32 {
    50
}

fn default_thumb_width() -> u32 {
    400
}

fn default_true() -> bool {
    true
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(api_base_url) = &args.api_base_url {
            self.api_base_url = api_base_url.clone();
        }
        if let Some(token) = &args.token {
            self.token = Some(token.clone());
        }
        if let Some(optimize) = args.optimize_images {
            self.optimize_images = optimize;
        }
        if let Some(debug_overlay) = args.debug_overlay {
            self.debug_overlay = debug_overlay;
        }
        if let Some(interval) = args.poll_interval_secs {
            self.poll_interval_secs = interval;
        }
        if let Some(limit) = args.job_limit {
            self.job_limit = limit;
        }
    }

    /// Poll interval as a duration. Zero is clamped to one second.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("boardlens.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            token: None,
            log_level: LogLevel::Info,
            api_base_url: default_api_base_url(),
            provider: default_provider(),
            poll_interval_secs: default_poll_interval(),
            job_limit: default_job_limit(),
            optimize_images: true,
            thumb_width: default_thumb_width(),
            debug_overlay: false,
        }
    }
}
