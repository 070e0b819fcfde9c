//! Remote backend wiring.
//!
//! Builds the object store and KMS client a command talks to from the
//! resolved store configuration.

use std::sync::Arc;

use crate::core::cipher::Kms;
use crate::core::config::StoreConfig;
use crate::core::store::ObjectStore;
use crate::error::Result;

/// Connected store and KMS client.
#[derive(Clone)]
pub struct Remote {
    pub store: Arc<dyn ObjectStore>,
    pub kms: Arc<dyn Kms>,
}

impl Remote {
    pub fn new(store: Arc<dyn ObjectStore>, kms: Arc<dyn Kms>) -> Self {
        Self { store, kms }
    }

    /// Connect to S3 and KMS.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingBucket` when no bucket is set.
    #[cfg(feature = "aws")]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        use crate::core::cipher::AwsKms;
        use crate::core::store::S3Store;

        let store = S3Store::connect(config).await?;
        let kms = AwsKms::connect(config).await;
        tracing::debug!(bucket = %store.bucket(), backend = kms.name(), "connected");
        Ok(Self::new(Arc::new(store), Arc::new(kms)))
    }

    /// Without the `aws` feature there is no backend to connect to.
    #[cfg(not(feature = "aws"))]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.require_bucket()?;
        Err(crate::error::ConfigError::NoBackend.into())
    }
}

/// Connect to KMS alone, for commands that never touch the bucket.
#[cfg(feature = "aws")]
pub async fn connect_kms(config: &StoreConfig) -> Result<Arc<dyn Kms>> {
    let kms = crate::core::cipher::AwsKms::connect(config).await;
    tracing::debug!(backend = kms.name(), "connected");
    Ok(Arc::new(kms))
}

#[cfg(not(feature = "aws"))]
pub async fn connect_kms(_config: &StoreConfig) -> Result<Arc<dyn Kms>> {
    Err(crate::error::ConfigError::NoBackend.into())
}

impl std::fmt::Debug for Remote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remote")
            .field("bucket", &self.store.bucket())
            .field("kms", &self.kms.name())
            .finish()
    }
}
