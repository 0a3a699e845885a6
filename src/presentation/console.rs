//! Plain-text rendering of job snapshots and resolved assets.

use chrono::{DateTime, Utc};

use crate::application::services::format_file_size;
use crate::domain::entities::{JobSnapshot, ResolvedAsset, SyncJob};

/// Renders a job snapshot as an active/history listing.
///
/// Active jobs come first with live durations; historical jobs follow with
/// their frozen durations. Backend order is preserved within each section.
#[must_use]
pub fn render_snapshot(snapshot: &JobSnapshot, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    let active: Vec<&SyncJob> = snapshot.active().collect();
    out.push_str(&format!("Active jobs ({})\n", active.len()));
    if active.is_empty() {
        out.push_str("  (none)\n");
    }
    for job in active {
        out.push_str(&render_job(job, now));
    }

    let historical: Vec<&SyncJob> = snapshot.historical().collect();
    out.push_str(&format!("\nHistory ({})\n", historical.len()));
    if historical.is_empty() {
        out.push_str("  (none)\n");
    }
    for job in historical {
        out.push_str(&render_job(job, now));
    }

    out
}

fn render_job(job: &SyncJob, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "  #{:<6} board {:<8} {:<8} {:>6}",
        job.id,
        job.board_id,
        job.status,
        job.format_duration(now)
    );
    if let Some(message) = &job.progress_message {
        line.push_str("  ");
        line.push_str(message);
    }
    line.push('\n');
    line
}

/// Renders resolved assets as a table, one line per asset.
#[must_use]
pub fn render_assets(assets: &[ResolvedAsset]) -> String {
    if assets.is_empty() {
        return "No displayable assets.\n".to_string();
    }

    let mut out = String::new();
    for asset in assets {
        let origin = if asset.is_local {
            "local"
        } else if asset.use_public {
            "public"
        } else {
            "gateway"
        };
        out.push_str(&format!(
            "  item {:<8} {:<10} {:>10}  {:<7}  {}\n",
            asset.item_id,
            asset.column_id,
            format_file_size(asset.size),
            origin,
            asset.proxy_url.as_deref().unwrap_or("(unresolvable)")
        ));
    }
    out
}
