//! Sync scheduler.
//!
//! A cycle lists every target, filters the listing, skips objects whose
//! fingerprint is already in the change cache and runs fetch → decrypt →
//! write for the rest. One-shot runs stop after the first cycle; continuous
//! runs wait for the poll interval and go again until cancelled.
//!
//! Failure policy: one-shot runs escalate the first listing or per-object
//! failure and stop. Continuous runs report it and carry on, expecting the
//! next poll to recover.
//!
//! Cancellation is cooperative. The token is checked between targets,
//! between objects and while waiting; an object already being fetched or
//! written is allowed to finish.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::core::cache::{needs_fetch, ChangeCache};
use crate::core::cipher::Kms;
use crate::core::constants;
use crate::core::domain::{
    CycleReport, ObjectReport, ObjectStatus, RemoteObject, Report, SyncTarget, TerminalState,
    Totals,
};
use crate::core::filter::PathFilter;
use crate::core::listing::list_objects;
use crate::core::materialize::{destination_path, ensure_dir, MaterializedFile, Materializer};
use crate::core::pipeline;
use crate::core::store::ObjectStore;
use crate::error::SyncError;

/// Parameters of one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub targets: Vec<SyncTarget>,
    pub output_dir: PathBuf,
    pub suffix: String,
    pub interval: Duration,
    pub continuous: bool,
    pub dry_run: bool,
    pub file_mode: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            targets: vec![SyncTarget::new("")],
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            suffix: constants::DEFAULT_SUFFIX.to_string(),
            interval: Duration::from_secs(constants::DEFAULT_INTERVAL_SECS),
            continuous: false,
            dry_run: false,
            file_mode: constants::DEFAULT_FILE_MODE,
        }
    }
}

/// How a single cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEnd {
    Completed,
    Cancelled,
    Failed(SyncError),
}

#[derive(Debug, Clone)]
struct CompiledTarget {
    filter: PathFilter,
    flatten: bool,
}

/// Drives sync cycles for one run and owns its change cache.
pub struct Syncer {
    store: Arc<dyn ObjectStore>,
    kms: Arc<dyn Kms>,
    options: SyncOptions,
    targets: Vec<CompiledTarget>,
    materializer: Materializer,
    cache: ChangeCache,
    cycles: u64,
}

impl Syncer {
    /// Prepare a run. Every target's filter is compiled here, before any
    /// listing happens.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidFilter` for the first pattern that does not
    /// compile.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        kms: Arc<dyn Kms>,
        options: SyncOptions,
    ) -> Result<Self, SyncError> {
        let targets = options
            .targets
            .iter()
            .map(|t| {
                Ok(CompiledTarget {
                    filter: PathFilter::for_target(t)?,
                    flatten: t.flatten,
                })
            })
            .collect::<Result<Vec<_>, SyncError>>()?;

        Ok(Self {
            store,
            kms,
            materializer: Materializer::new(options.dry_run, options.file_mode),
            options,
            targets,
            cache: ChangeCache::new(),
            cycles: 0,
        })
    }

    pub fn cache(&self) -> &ChangeCache {
        &self.cache
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run until done, failed or cancelled. The first cycle starts
    /// immediately.
    pub async fn run(mut self, cancel: CancellationToken) -> Report {
        let mut totals = Totals::default();
        let mut last_cycle = CycleReport::default();

        let state = match self.prepare_output() {
            Err(e) => TerminalState::Failed(e),
            Ok(()) => loop {
                if cancel.is_cancelled() {
                    break TerminalState::Cancelled;
                }

                let (cycle, end) = self.run_cycle(&cancel).await;
                totals.add(&cycle);
                info!(
                    cycle = cycle.cycle,
                    materialized = cycle.materialized(),
                    unchanged = cycle.unchanged(),
                    failed = cycle.failed(),
                    "cycle finished"
                );
                last_cycle = cycle;

                match end {
                    CycleEnd::Failed(e) => break TerminalState::Failed(e),
                    CycleEnd::Cancelled => break TerminalState::Cancelled,
                    CycleEnd::Completed if !self.options.continuous => break TerminalState::Done,
                    CycleEnd::Completed => {}
                }

                debug!(interval = ?self.options.interval, "waiting for next poll");
                tokio::select! {
                    _ = tokio::time::sleep(self.options.interval) => {}
                    _ = cancel.cancelled() => break TerminalState::Cancelled,
                }
            },
        };

        match &state {
            TerminalState::Cancelled => info!(cycles = self.cycles, "sync cancelled"),
            TerminalState::Done => debug!(cycles = self.cycles, "sync done"),
            TerminalState::Failed(e) => error!(error = %e, "sync failed"),
        }

        Report {
            state,
            cycles: self.cycles,
            totals,
            last_cycle,
        }
    }

    fn prepare_output(&self) -> Result<(), SyncError> {
        if self.materializer.is_dry_run() {
            return Ok(());
        }
        ensure_dir(&self.options.output_dir).map_err(|e| SyncError::WriteFailed {
            path: self.options.output_dir.clone(),
            reason: e.to_string(),
        })
    }

    /// Run one listing + processing pass over every target.
    pub async fn run_cycle(&mut self, cancel: &CancellationToken) -> (CycleReport, CycleEnd) {
        self.cycles += 1;
        let mut report = CycleReport::new(self.cycles);

        for target in self.targets.clone() {
            if cancel.is_cancelled() {
                return (report, CycleEnd::Cancelled);
            }

            let prefix = target.filter.prefix();
            debug!(prefix = %prefix, recursive = target.filter.is_recursive(), "listing target");
            let objects = match list_objects(self.store.as_ref(), prefix).await {
                Ok(objects) => objects,
                Err(e) if self.options.continuous => {
                    warn!(error = %e, "listing failed, retrying next poll");
                    report.listing_errors.push(e.to_string());
                    return (report, CycleEnd::Completed);
                }
                Err(e) => return (report, CycleEnd::Failed(e)),
            };

            let accepted: Vec<RemoteObject> = objects
                .into_iter()
                .filter(|o| target.filter.matches(&o.key))
                .collect();
            if accepted.is_empty() {
                warn!(prefix = %prefix, "found zero files under the path");
            }

            for object in accepted {
                if cancel.is_cancelled() {
                    return (report, CycleEnd::Cancelled);
                }
                if let Some(e) = self.process(&object, target.flatten, &mut report).await {
                    if !self.options.continuous {
                        return (report, CycleEnd::Failed(e));
                    }
                }
            }
        }

        (report, CycleEnd::Completed)
    }

    /// Handle one listed object, recording its outcome. Returns the error if
    /// it failed.
    async fn process(
        &mut self,
        object: &RemoteObject,
        flatten: bool,
        report: &mut CycleReport,
    ) -> Option<SyncError> {
        if object.is_directory_marker {
            trace!(key = %object.key, "skipping directory marker");
            return None;
        }

        if !needs_fetch(object, &self.cache) {
            debug!(key = %object.key, "unchanged, skipping");
            report.objects.push(ObjectReport {
                key: object.key.clone(),
                destination: None,
                status: ObjectStatus::Unchanged,
            });
            return None;
        }

        let Some(destination) = destination_path(
            &self.options.output_dir,
            &object.key,
            flatten,
            &self.options.suffix,
        ) else {
            warn!(key = %object.key, "key names no file, skipping");
            // remembered so a continuous run warns once per change
            self.cache.record(object);
            report.objects.push(ObjectReport {
                key: object.key.clone(),
                destination: None,
                status: ObjectStatus::Skipped("key names no file".into()),
            });
            return None;
        };

        match self.materialize(object, destination.clone()).await {
            Ok(()) => {
                self.cache.record(object);
                info!(
                    action = "get",
                    bucket = %self.store.bucket(),
                    key = %object.key,
                    destination = %destination.display(),
                    "retrieved the file"
                );
                report.objects.push(ObjectReport {
                    key: object.key.clone(),
                    destination: Some(destination),
                    status: ObjectStatus::Materialized,
                });
                None
            }
            Err(e) => {
                warn!(
                    action = "get",
                    bucket = %self.store.bucket(),
                    key = %object.key,
                    error = %e,
                    "failed to retrieve key"
                );
                report.objects.push(ObjectReport {
                    key: object.key.clone(),
                    destination: Some(destination),
                    status: ObjectStatus::Failed(e.to_string()),
                });
                Some(e)
            }
        }
    }

    async fn materialize(
        &self,
        object: &RemoteObject,
        destination: PathBuf,
    ) -> Result<(), SyncError> {
        let content = pipeline::retrieve(
            self.store.as_ref(),
            self.kms.as_ref(),
            &object.key,
            &self.options.suffix,
        )
        .await?;

        self.materializer
            .write(&MaterializedFile {
                destination,
                content,
            })
    }
}

impl std::fmt::Debug for Syncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Syncer")
            .field("bucket", &self.store.bucket())
            .field("kms", &self.kms.name())
            .field("options", &self.options)
            .field("cached", &self.cache.len())
            .field("cycles", &self.cycles)
            .finish()
    }
}
