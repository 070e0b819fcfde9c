//! Amazon S3 store backend.
//!
//! Works against AWS S3 and S3-compatible services when an endpoint is
//! configured. Credentials come from the AWS default provider chain.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::ObjectStore;
use crate::core::config::StoreConfig;
use crate::core::domain::RemoteObject;
use crate::error::{RemoteError, Result};

/// S3 bucket accessed through the AWS SDK.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a store for the configured bucket.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingBucket` if no bucket is configured.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let bucket = config.require_bucket()?.to_string();
        let sdk_config = config.sdk_config().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            debug!(endpoint = %endpoint, "using custom s3 endpoint");
            // path-style addressing is what MinIO and most compatible stores expect
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket,
        })
    }
}

fn remote<E: std::error::Error>(err: E) -> RemoteError {
    RemoteError::new(DisplayErrorContext(err).to_string())
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list(&self, prefix: &str) -> std::result::Result<Vec<RemoteObject>, RemoteError> {
        debug!(bucket = %self.bucket, prefix = %prefix, "listing objects");

        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }

            let resp = request.send().await.map_err(remote)?;

            for object in resp.contents() {
                let Some(key) = object.key() else { continue };
                objects.push(RemoteObject::new(
                    key,
                    object.e_tag().unwrap_or_default(),
                    object.size().unwrap_or(0).max(0) as u64,
                    object.last_modified().and_then(to_chrono),
                ));
            }

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated() == Some(true) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        debug!(count = objects.len(), prefix = %prefix, "listed objects");
        Ok(objects)
    }

    async fn fetch(&self, key: &str) -> std::result::Result<Vec<u8>, RemoteError> {
        debug!(bucket = %self.bucket, key = %key, "retrieving object");

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(remote)?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| RemoteError::new(format!("failed to read response body: {}", e)))?;

        let data = body.into_bytes().to_vec();
        trace!(key = %key, len = data.len(), "retrieved object");
        Ok(data)
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> std::result::Result<(), RemoteError> {
        debug!(bucket = %self.bucket, key = %key, len = body.len(), "putting object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(remote)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), RemoteError> {
        debug!(bucket = %self.bucket, key = %key, "deleting object");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(remote)?;
        Ok(())
    }
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
