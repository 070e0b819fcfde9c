//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, encrypted keys
//! - Red: errors, plain (unencrypted) keys
//! - Yellow: warnings
//! - Cyan: paths, hints
//! - Blue: directory markers
//! - Dimmed: secondary info

use std::fmt::Display;

use console::style;
use serde::Serialize;

use crate::core::domain::{ObjectStatus, Report, TerminalState};
use crate::error::Result;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ uploaded db.encrypted`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("✓").green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message to stderr (yellow).
pub fn warn(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("⚠").yellow(), msg);
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// Print a hint message to stderr (cyan).
///
/// Example: `→ set --bucket or AWS_S3_BUCKET`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {}  {}", style(label).dim(), style(value).bold());
    } else {
        println!("  {}  {}", label, value);
    }
}

/// Format a dimmed/secondary message.
pub fn dim(msg: &str) -> String {
    if colors_enabled() {
        style(msg).dim().to_string()
    } else {
        msg.to_string()
    }
}

/// Format a path string in cyan.
pub fn path(p: &str) -> String {
    if colors_enabled() {
        style(p).cyan().to_string()
    } else {
        p.to_string()
    }
}

/// Format a bucket key by kind: blue for directory markers, green when
/// encrypted, red when stored in plain text.
pub fn key(k: &str, encrypted: bool, directory: bool) -> String {
    if !colors_enabled() {
        return k.to_string();
    }
    if directory {
        style(k).blue().to_string()
    } else if encrypted {
        style(k).green().to_string()
    } else {
        style(k).red().to_string()
    }
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a sync report summary.
pub fn report(report: &Report) {
    for object in &report.last_cycle.objects {
        match &object.status {
            ObjectStatus::Failed(reason) => error(&format!("{}: {}", object.key, reason)),
            ObjectStatus::Skipped(reason) => warn(&format!("{}: {}", object.key, reason)),
            _ => {}
        }
    }
    for listing in &report.last_cycle.listing_errors {
        error(listing);
    }

    let state = match &report.state {
        TerminalState::Done => "done".to_string(),
        TerminalState::Cancelled => "cancelled".to_string(),
        TerminalState::Failed(_) => "failed".to_string(),
    };
    kv("state:      ", state);
    kv("cycles:     ", report.cycles);
    kv("retrieved:  ", report.totals.materialized);
    kv("unchanged:  ", report.totals.unchanged);
    kv("failed:     ", report.totals.failed);
    if report.totals.skipped > 0 {
        kv("skipped:    ", report.totals.skipped);
    }
}
