use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "boardlens",
    version,
    about = "Board asset resolver and sync-job watcher",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Backend API base URL.
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Bearer credential for the backend.
    #[arg(long, env = "BOARDLENS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request width-limited optimized renditions.
    #[arg(long)]
    pub optimize_images: Option<bool>,

    /// Show the local/remote origin indicator on resolved assets.
    #[arg(long)]
    pub debug_overlay: Option<bool>,

    /// Seconds between job polls.
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,

    /// Maximum number of jobs requested per poll.
    #[arg(long)]
    pub job_limit: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current sync-job queue once.
    Jobs,
    /// Watch the job queue, polling while jobs are active.
    Watch {
        /// Poll on every interval even when no job is active.
        #[arg(long)]
        continuous: bool,
    },
    /// Reset the queue, force-failing all pending and running jobs.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Resolve displayable assets for a board's items.
    Resolve {
        /// Board to resolve.
        board_id: String,
        /// Only resolve this item.
        #[arg(long, value_name = "ITEM_ID")]
        item: Option<String>,
        /// Only resolve this file column.
        #[arg(long, value_name = "COLUMN_ID")]
        column: Option<String>,
        /// Download each resolved asset and report its decoded status.
        #[arg(long)]
        download: bool,
    },
}
