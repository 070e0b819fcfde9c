//! Command-line interface.

pub mod cat;
pub mod completions;
pub mod get;
pub mod kms;
pub mod list;
pub mod output;
pub mod put;
pub mod rm;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::config::{Config, StoreConfig};
use crate::core::constants;
use crate::error::{ConfigError, Result};

/// s3secrets - distribute KMS-encrypted secrets from S3.
#[derive(Parser)]
#[command(
    name = "s3secrets",
    about = "Retrieve, decrypt and keep secrets in sync from an S3 bucket",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Name of the S3 bucket containing the encrypted files
    #[arg(short, long, env = "AWS_S3_BUCKET", global = true)]
    pub bucket: Option<String>,

    /// AWS region where the resources are located
    #[arg(long, env = "AWS_DEFAULT_REGION", global = true)]
    pub region: Option<String>,

    /// Endpoint URL of an S3-compatible store
    #[arg(long, env = "S3SECRETS_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// AWS profile to take credentials from
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// File suffix marking an object as KMS-encrypted
    #[arg(long, env = "S3SECRETS_SUFFIX", global = true)]
    pub suffix: Option<String>,

    /// Config file (defaults to ./s3secrets.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Format of log lines on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Retrieve, decrypt and write files from the bucket, once or continuously
    Get(get::GetArgs),

    /// List the files in the bucket
    #[command(alias = "list")]
    Ls(list::ListArgs),

    /// Retrieve and print files, decrypting if required
    Cat {
        /// Keys to print
        #[arg(required = true)]
        keys: Vec<String>,
        /// Print the stored bytes without decrypting
        #[arg(long)]
        no_decrypt: bool,
    },

    /// Encrypt local files with KMS and upload them to the bucket
    Put(put::PutArgs),

    /// Delete files from the bucket
    #[command(alias = "delete")]
    Rm {
        /// Keys to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Encrypt and decrypt local files with KMS
    #[command(subcommand)]
    #[command(alias = "k")]
    Kms(kms::KmsCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Command result format.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Log line format.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Resolved settings for one invocation: flags over config file over defaults.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub store: StoreConfig,
    pub suffix: String,
    pub format: OutputFormat,
}

impl Context {
    pub fn resolve(global: &GlobalArgs) -> Result<Self> {
        let config = Config::load(global.config.as_deref())?;

        let store = StoreConfig {
            bucket: global.bucket.clone(),
            region: global.region.clone(),
            endpoint: global.endpoint.clone(),
            profile: global.profile.clone(),
        }
        .or(&config.store);

        let suffix = global
            .suffix
            .clone()
            .or_else(|| config.sync.suffix.clone())
            .unwrap_or_else(|| constants::DEFAULT_SUFFIX.to_string());
        if suffix.is_empty() {
            return Err(ConfigError::InvalidOption("suffix must not be empty".into()).into());
        }

        Ok(Self {
            config,
            store,
            suffix,
            format: global.format,
        })
    }
}

/// Execute a command.
pub async fn execute(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;

    if let Command::Completions { shell } = command {
        return completions::execute(shell);
    }

    let ctx = Context::resolve(&global)?;

    match command {
        Command::Get(args) => get::execute(&ctx, args).await,
        Command::Ls(args) => list::execute(&ctx, args).await,
        Command::Cat { keys, no_decrypt } => cat::execute(&ctx, &keys, no_decrypt).await,
        Command::Put(args) => put::execute(&ctx, args).await,
        Command::Rm { keys } => rm::execute(&ctx, &keys).await,
        Command::Kms(command) => kms::execute(&ctx, command).await,
        Command::Completions { .. } => Ok(()),
    }
}
