//! Constants used throughout s3secrets.
//!
//! Centralizes defaults shared by the CLI, the config file and the sync core.

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "s3secrets.toml";

/// Suffix marking an object as KMS-encrypted.
pub const DEFAULT_SUFFIX: &str = ".encrypted";

/// Directory plaintext secrets are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "./secrets";

/// Key filter accepting everything.
pub const DEFAULT_FILTER: &str = ".*";

/// Time between polls in continuous mode.
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Permissions of materialized files.
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Permissions of directories created under the output directory.
pub const DIR_MODE: u32 = 0o755;

/// Key separator of the object store.
pub const SEPARATOR: char = '/';
