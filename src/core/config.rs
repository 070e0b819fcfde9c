//! Configuration file management.
//!
//! Handles reading and validating the optional `s3secrets.toml` file. Values
//! given on the command line or through environment variables take
//! precedence; the file only fills in what was left unset.
//!
//! ```toml
//! [store]
//! bucket = "platform-secrets"
//! region = "eu-west-2"
//!
//! [sync]
//! output_dir = "/run/secrets"
//! interval = "1m"
//! file_mode = "0640"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Contents of `s3secrets.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Where the secrets live and how to reach them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Bucket holding the encrypted files
    pub bucket: Option<String>,
    /// AWS region; the provider chain decides when unset
    pub region: Option<String>,
    /// Endpoint URL for S3-compatible stores
    pub endpoint: Option<String>,
    /// Named AWS profile
    pub profile: Option<String>,
}

/// Defaults for the `get` command.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub output_dir: Option<PathBuf>,
    pub suffix: Option<String>,
    /// Poll interval, e.g. `30s`, `5m`
    pub interval: Option<String>,
    /// Octal permissions of written files, e.g. `0600`
    pub file_mode: Option<String>,
}

impl Config {
    /// Load the config file at `path`, or the default file if present.
    ///
    /// An explicitly requested file must exist; the default one is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file cannot be read, or
    /// `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(constants::CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
        Self::parse(&contents)
    }

    /// Parse and validate TOML contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(suffix) = &self.sync.suffix {
            if suffix.is_empty() {
                return Err(ConfigError::InvalidOption("suffix must not be empty".into()).into());
            }
        }
        if let Some(interval) = &self.sync.interval {
            parse_interval(interval)?;
        }
        if let Some(mode) = &self.sync.file_mode {
            parse_mode(mode)?;
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Fill unset fields from another source (the config file).
    pub fn or(self, fallback: &StoreConfig) -> Self {
        Self {
            bucket: self.bucket.or_else(|| fallback.bucket.clone()),
            region: self.region.or_else(|| fallback.region.clone()),
            endpoint: self.endpoint.or_else(|| fallback.endpoint.clone()),
            profile: self.profile.or_else(|| fallback.profile.clone()),
        }
    }

    /// Bucket name, required by every remote command.
    pub fn require_bucket(&self) -> Result<&str> {
        match self.bucket.as_deref() {
            Some(b) if !b.is_empty() => Ok(b),
            _ => Err(ConfigError::MissingBucket.into()),
        }
    }

    /// Load the shared AWS SDK configuration for this store.
    #[cfg(feature = "aws")]
    pub async fn sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        loader.load().await
    }
}

/// Parse a poll interval: plain seconds or a number with an `s`, `m` or `h`
/// suffix.
///
/// # Errors
///
/// Returns `ConfigError::InvalidInterval` for malformed or zero intervals.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidInterval(value.to_string());

    let (digits, unit) = match value.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((i, _)) => value.split_at(i),
        None => (value, "s"),
    };
    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    let secs = match unit {
        "s" => Some(amount),
        "m" => amount.checked_mul(60),
        "h" => amount.checked_mul(3600),
        _ => None,
    }
    .ok_or_else(invalid)?;

    if secs == 0 {
        return Err(invalid().into());
    }
    Ok(Duration::from_secs(secs))
}

/// Parse octal file permissions such as `0600` or `644`.
pub fn parse_mode(value: &str) -> Result<u32> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o777 => Ok(mode),
        _ => Err(ConfigError::InvalidMode(value.to_string()).into()),
    }
}
