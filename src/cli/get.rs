//! Get command: one-shot retrieval or continuous sync.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::cli::{output, Context, OutputFormat};
use crate::core::config::{parse_interval, parse_mode};
use crate::core::constants;
use crate::core::domain::{SyncTarget, TerminalState};
use crate::core::filter::PathFilter;
use crate::core::remote::Remote;
use crate::core::signal::shutdown_token;
use crate::core::sync::{SyncOptions, Syncer};
use crate::error::Result;

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Paths in the bucket to retrieve (default: the whole bucket)
    pub paths: Vec<String>,

    /// Directory to write the decrypted files into
    #[arg(short = 'd', long, env = "S3SECRETS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Retrieve everything below the paths, not just direct children
    #[arg(short, long)]
    pub recursive: bool,

    /// Write every file directly into the output directory
    #[arg(long)]
    pub flatten: bool,

    /// Regular expression keys must also match
    #[arg(short, long, default_value = constants::DEFAULT_FILTER)]
    pub filter: String,

    /// Keep polling the bucket and refresh changed files
    #[arg(short, long)]
    pub sync: bool,

    /// Time between polls, e.g. 30s, 5m, 1h
    #[arg(short = 'i', long)]
    pub sync_interval: Option<String>,

    /// Print the decrypted content instead of writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Octal permissions of written files
    #[arg(long)]
    pub perms: Option<String>,
}

impl GetArgs {
    /// Build the run options: flags over config file over defaults.
    pub fn options(&self, ctx: &Context) -> Result<SyncOptions> {
        let sync = &ctx.config.sync;

        let output_dir = self
            .output_dir
            .clone()
            .or_else(|| sync.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_OUTPUT_DIR));

        let interval = match self.sync_interval.as_deref().or(sync.interval.as_deref()) {
            Some(value) => parse_interval(value)?,
            None => Duration::from_secs(constants::DEFAULT_INTERVAL_SECS),
        };

        let file_mode = match self.perms.as_deref().or(sync.file_mode.as_deref()) {
            Some(value) => parse_mode(value)?,
            None => constants::DEFAULT_FILE_MODE,
        };

        let paths: Vec<&str> = if self.paths.is_empty() {
            vec![""]
        } else {
            self.paths.iter().map(String::as_str).collect()
        };
        let targets = paths
            .into_iter()
            .map(|p| {
                SyncTarget::new(p)
                    .recursive(self.recursive)
                    .flatten(self.flatten)
                    .pattern(self.filter.as_str())
            })
            .collect();

        Ok(SyncOptions {
            targets,
            output_dir,
            suffix: ctx.suffix.clone(),
            interval,
            continuous: self.sync,
            dry_run: self.dry_run,
            file_mode,
        })
    }
}

/// Run the sync and report how it ended.
pub async fn execute(ctx: &Context, args: GetArgs) -> Result<()> {
    let options = args.options(ctx)?;
    let bucket = ctx.store.require_bucket()?;

    // a bad filter fails before connecting or listing anything
    for target in &options.targets {
        PathFilter::for_target(target)?;
    }

    let remote = Remote::connect(&ctx.store).await?;
    let syncer = Syncer::new(remote.store, remote.kms, options)?;

    info!(
        action = "get",
        bucket = %bucket,
        continuous = syncer.options().continuous,
        output_dir = %syncer.options().output_dir.display(),
        "starting"
    );

    let dry_run = syncer.options().dry_run;
    let report = syncer.run(shutdown_token()).await;

    match ctx.format {
        OutputFormat::Json => output::json(&report)?,
        OutputFormat::Text if !dry_run => output::report(&report),
        OutputFormat::Text => {}
    }

    match report.state {
        TerminalState::Failed(e) => Err(e.into()),
        TerminalState::Done | TerminalState::Cancelled => Ok(()),
    }
}
