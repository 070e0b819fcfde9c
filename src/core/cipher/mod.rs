//! Envelope-encryption backends.
//!
//! The sync core never sees key material: ciphertext goes to a [`Kms`]
//! implementation and plaintext comes back. Plaintext buffers are wrapped in
//! [`Zeroizing`] so they are wiped when dropped.
//!
//! ## Backends
//!
//! - **AWS KMS**: Feature-gated (`aws`). KMS embeds the key reference in the
//!   ciphertext, so decryption needs no key id.

use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::RemoteError;

#[cfg(feature = "aws")]
mod aws;

#[cfg(feature = "aws")]
pub use aws::AwsKms;

/// Plaintext secret bytes, wiped on drop.
pub type Plaintext = Zeroizing<Vec<u8>>;

/// A named alias for a KMS key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAlias {
    pub name: String,
    /// Key the alias points at. Unset for unassigned, AWS-reserved aliases.
    pub target_key_id: Option<String>,
}

/// Key management service capable of encrypting and decrypting blobs.
#[async_trait]
pub trait Kms: Send + Sync {
    /// Encrypt plaintext under the given key id or ARN.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, RemoteError>;

    /// Decrypt a ciphertext blob.
    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Plaintext, RemoteError>;

    /// Every key alias visible to the caller.
    async fn list_aliases(&self) -> Result<Vec<KeyAlias>, RemoteError>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}
