//! s3secrets - retrieve KMS-encrypted secrets from S3 and keep them in sync.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use s3secrets::cli::output;
use s3secrets::cli::{execute, Cli, LogFormat};
use s3secrets::error::{ConfigError, Error, SyncError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("S3SECRETS_LOG").unwrap_or_else(|_| {
        if cli.global.verbose {
            EnvFilter::new("s3secrets=debug")
        } else {
            EnvFilter::new("s3secrets=info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    match cli.global.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            output::error(&format!("failed to start runtime: {}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(execute(cli)) {
        let suggestion = match &e {
            Error::Config(ConfigError::MissingBucket) => {
                Some("set --bucket, AWS_S3_BUCKET or [store] bucket in s3secrets.toml")
            }
            Error::Config(ConfigError::MissingKmsKey) => Some("set --kms or AWS_KMS_ID"),
            Error::Sync(SyncError::InvalidFilter { .. }) => {
                Some("--filter takes a regular expression, e.g. '\\.pem$'")
            }
            Error::Sync(e) if e.is_per_object() => {
                Some("use --sync to keep going past objects that fail")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
