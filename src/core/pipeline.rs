//! Decrypt pipeline.
//!
//! Fetch the raw bytes of a key and, when the key carries the encryption
//! suffix, hand them to KMS. Keys without the suffix pass through untouched.

use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::core::cipher::{Kms, Plaintext};
use crate::core::store::ObjectStore;
use crate::error::SyncError;

/// Whether a key is stored encrypted under the suffix convention.
pub fn is_encrypted(key: &str, suffix: &str) -> bool {
    !suffix.is_empty() && key.ends_with(suffix)
}

/// Name a key (or file name) materializes under: the suffix is dropped for
/// encrypted keys, everything else is unchanged.
pub fn plaintext_name<'a>(name: &'a str, suffix: &str) -> &'a str {
    if is_encrypted(name, suffix) {
        &name[..name.len() - suffix.len()]
    } else {
        name
    }
}

/// Retrieve an object's raw bytes.
///
/// # Errors
///
/// Returns `SyncError::FetchFailed` wrapping the store error.
pub async fn fetch(store: &dyn ObjectStore, key: &str) -> Result<Vec<u8>, SyncError> {
    store.fetch(key).await.map_err(|e| SyncError::FetchFailed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decrypt the ciphertext of `key`.
///
/// # Errors
///
/// Returns `SyncError::DecryptFailed` wrapping the KMS error.
pub async fn decrypt(kms: &dyn Kms, key: &str, ciphertext: &[u8]) -> Result<Plaintext, SyncError> {
    trace!(key = %key, ciphertext_len = ciphertext.len(), backend = kms.name(), "decrypting");
    kms.decrypt(ciphertext)
        .await
        .map_err(|e| SyncError::DecryptFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Fetch a key and decrypt it if it carries the suffix.
pub async fn retrieve(
    store: &dyn ObjectStore,
    kms: &dyn Kms,
    key: &str,
    suffix: &str,
) -> Result<Plaintext, SyncError> {
    let raw = fetch(store, key).await?;

    if !is_encrypted(key, suffix) {
        debug!(key = %key, "not encrypted, passing through");
        return Ok(Zeroizing::new(raw));
    }

    let ciphertext = Zeroizing::new(raw);
    decrypt(kms, key, &ciphertext).await
}
