//! Object store access.
//!
//! Abstracts the remote bucket behind the [`ObjectStore`] trait so the sync
//! core never touches a transport directly.
//!
//! ## Adding a New Store Backend
//!
//! 1. Implement the `ObjectStore` trait
//! 2. Add the implementation in a new file (e.g., `gcs.rs`)
//! 3. Feature-gate if it pulls in an SDK
//! 4. Re-export from this module

use async_trait::async_trait;

use crate::core::domain::RemoteObject;
use crate::error::RemoteError;

#[cfg(feature = "aws")]
mod s3;

#[cfg(feature = "aws")]
pub use s3::S3Store;

/// Remote key/blob store scoped to one bucket.
///
/// Implementations must not recurse with a delimiter: `list` returns every
/// object whose key starts with the prefix, following pagination, and leaves
/// depth filtering to the caller.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store is bound to, for reporting.
    fn bucket(&self) -> &str;

    /// List every object under a prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>, RemoteError>;

    /// Retrieve the full content of an object.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, RemoteError>;

    /// Upload (or overwrite) an object.
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), RemoteError>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> Result<(), RemoteError>;
}
