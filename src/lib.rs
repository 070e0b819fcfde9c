//! s3secrets - retrieve KMS-encrypted secrets from S3 and keep them in sync.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── get           # One-shot retrieval / continuous sync
//! │   ├── list          # List keys under a path
//! │   ├── cat           # Print (decrypted) keys
//! │   ├── put           # Encrypt and upload files
//! │   ├── rm            # Delete keys
//! │   ├── kms           # Encrypt/decrypt local files, list key aliases
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # s3secrets.toml management
//!     ├── filter        # Prefix + depth + regex key predicate
//!     ├── listing       # Ordered, de-duplicated listings
//!     ├── cache         # Per-run change cache
//!     ├── pipeline      # Fetch → decrypt
//!     ├── materialize   # Destination paths and atomic writes
//!     ├── sync          # Poll scheduler
//!     ├── signal        # Termination signals → cancellation
//!     ├── cipher/       # KMS backends
//!     │   ├── mod       # Kms trait
//!     │   └── aws       # AWS KMS implementation
//!     └── store/        # Object store backends
//!         ├── mod       # ObjectStore trait
//!         └── s3        # Amazon S3 implementation
//! ```
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> s3secrets::error::Result<()> {
//! use s3secrets::core::config::StoreConfig;
//! use s3secrets::core::domain::SyncTarget;
//! use s3secrets::core::remote::Remote;
//! use s3secrets::core::sync::{SyncOptions, Syncer};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = StoreConfig {
//!     bucket: Some("platform-secrets".into()),
//!     ..Default::default()
//! };
//! let remote = Remote::connect(&store).await?;
//! let options = SyncOptions {
//!     targets: vec![SyncTarget::new("compute").recursive(true)],
//!     ..Default::default()
//! };
//! let report = Syncer::new(remote.store, remote.kms, options)?
//!     .run(CancellationToken::new())
//!     .await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
