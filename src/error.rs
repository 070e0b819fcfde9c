//! Error types.
//!
//! [`SyncError`] is the failure taxonomy of the sync pipeline. It only carries
//! strings so that a terminal [`Report`](crate::core::domain::Report) can own
//! a copy of the error that stopped the run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the list → fetch → decrypt → write pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("filter: {pattern} is invalid, message: {reason}")]
    InvalidFilter { pattern: String, reason: String },

    #[error("failed to list s3://{bucket}/{prefix}: {reason}")]
    ListFailed {
        bucket: String,
        prefix: String,
        reason: String,
    },

    #[error("failed to retrieve the object: {key}, error: {reason}")]
    FetchFailed { key: String, reason: String },

    #[error("failed to decrypt the object: {key}, error: {reason}")]
    DecryptFailed { key: String, reason: String },

    #[error("failed to write file: {}, error: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },
}

impl SyncError {
    /// Whether the failure is scoped to a single object rather than a listing.
    pub fn is_per_object(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::DecryptFailed { .. } | Self::WriteFailed { .. }
        )
    }
}

/// Configuration and argument errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("you have not specified a s3 bucket name")]
    MissingBucket,

    #[error("you have not set the kms id in order to encrypt the file")]
    MissingKmsKey,

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("invalid file mode: {0} (expected octal, e.g. 0600)")]
    InvalidMode(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no store backend compiled: rebuild with --features aws")]
    NoBackend,

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Opaque failure reported by a remote collaborator (object store or KMS).
///
/// The pipeline wraps it into the matching [`SyncError`] variant together
/// with the key or path it was working on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RemoteError(pub String);

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
