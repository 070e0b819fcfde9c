//! AWS KMS cipher backend.
//!
//! Encrypts and decrypts secrets using AWS Key Management Service.
//! Enabled by the `aws` feature (on by default).
//!
//! Credentials come from the environment (AWS_ACCESS_KEY_ID, etc.), a named
//! profile, or the default credential provider chain.

use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{KeyAlias, Kms, Plaintext};
use crate::core::config::StoreConfig;
use crate::error::RemoteError;

/// AWS KMS client.
pub struct AwsKms {
    client: Client,
}

impl AwsKms {
    /// Create a KMS client sharing the store's region and profile.
    pub async fn connect(config: &StoreConfig) -> Self {
        let sdk_config = config.sdk_config().await;
        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl Kms for AwsKms {
    fn name(&self) -> &'static str {
        "aws-kms"
    }

    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, RemoteError> {
        trace!(plaintext_len = plaintext.len(), "encrypting with AWS KMS");

        let result = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext))
            .send()
            .await
            .map_err(|e| {
                RemoteError::new(format!("KMS encrypt failed: {}", DisplayErrorContext(e)))
            })?;

        let blob = result
            .ciphertext_blob()
            .ok_or_else(|| RemoteError::new("no ciphertext returned"))?;

        trace!(ciphertext_len = blob.as_ref().len(), "encrypted with AWS KMS");
        Ok(blob.as_ref().to_vec())
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Plaintext, RemoteError> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting with AWS KMS");

        // KMS stores the key ID in the ciphertext blob, so we don't need to specify it
        let result = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|e| {
                RemoteError::new(format!("KMS decrypt failed: {}", DisplayErrorContext(e)))
            })?;

        let blob = result
            .plaintext()
            .ok_or_else(|| RemoteError::new("no plaintext returned"))?;

        let plaintext = Zeroizing::new(blob.as_ref().to_vec());
        trace!(plaintext_len = plaintext.len(), "decrypted with AWS KMS");
        Ok(plaintext)
    }

    async fn list_aliases(&self) -> Result<Vec<KeyAlias>, RemoteError> {
        let mut aliases = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_aliases();
            if let Some(m) = marker.take() {
                request = request.marker(m);
            }

            let resp = request.send().await.map_err(|e| {
                RemoteError::new(format!("KMS list aliases failed: {}", DisplayErrorContext(e)))
            })?;

            for entry in resp.aliases() {
                let Some(name) = entry.alias_name() else { continue };
                aliases.push(KeyAlias {
                    name: name.to_string(),
                    target_key_id: entry.target_key_id().map(str::to_string),
                });
            }

            // only set while the listing is truncated
            match resp.next_marker() {
                Some(m) => marker = Some(m.to_string()),
                None => break,
            }
        }

        debug!(count = aliases.len(), "listed KMS aliases");
        Ok(aliases)
    }
}
