//! Sync reports.
//!
//! Per-object outcomes are collected per cycle. A run keeps aggregate totals
//! and the outcomes of its last cycle only, so a continuous run does not grow
//! without bound.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::types::ObjectKey;
use crate::error::SyncError;

/// What happened to one listed object in one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum ObjectStatus {
    /// Fetched, decrypted if required and written.
    Materialized,
    /// Fingerprint matched the change cache; nothing fetched.
    Unchanged,
    /// Fetch, decrypt or write failed.
    Failed(String),
    /// Key names no file, e.g. a bare suffix or a trailing separator.
    Skipped(String),
}

/// Outcome for a single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectReport {
    pub key: ObjectKey,
    pub destination: Option<PathBuf>,
    #[serde(flatten)]
    pub status: ObjectStatus,
}

/// Outcomes of one listing + processing pass over every target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub objects: Vec<ObjectReport>,
    /// Listing failures reported (not escalated) in continuous mode.
    pub listing_errors: Vec<String>,
}

impl CycleReport {
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            ..Self::default()
        }
    }

    pub fn materialized(&self) -> usize {
        self.count(|s| matches!(s, ObjectStatus::Materialized))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, ObjectStatus::Unchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ObjectStatus::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ObjectStatus::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&ObjectStatus) -> bool) -> usize {
        self.objects.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Counters accumulated over every cycle of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub materialized: u64,
    pub unchanged: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl Totals {
    pub(crate) fn add(&mut self, cycle: &CycleReport) {
        self.materialized += cycle.materialized() as u64;
        self.unchanged += cycle.unchanged() as u64;
        self.failed += cycle.failed() as u64;
        self.skipped += cycle.skipped() as u64;
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "lowercase")]
pub enum TerminalState {
    /// One-shot run completed every target.
    Done,
    /// A termination signal was observed.
    Cancelled,
    /// The first fatal error encountered.
    Failed(#[serde(serialize_with = "display")] SyncError),
}

fn display<S: serde::Serializer>(err: &SyncError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Result of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub state: TerminalState,
    pub cycles: u64,
    pub totals: Totals,
    pub last_cycle: CycleReport,
}

impl Report {
    pub fn is_success(&self) -> bool {
        !matches!(self.state, TerminalState::Failed(_))
    }

    pub fn error(&self) -> Option<&SyncError> {
        match &self.state {
            TerminalState::Failed(err) => Some(err),
            _ => None,
        }
    }
}
