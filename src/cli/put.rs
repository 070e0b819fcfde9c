//! Put command: encrypt local files and upload them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::cli::{output, Context};
use crate::core::cipher::Kms;
use crate::core::constants::SEPARATOR;
use crate::core::filter::normalize_prefix;
use crate::core::pipeline::is_encrypted;
use crate::core::remote::Remote;
use crate::core::store::ObjectStore;
use crate::error::{ConfigError, Error, RemoteError, Result};

#[derive(Args, Debug, Clone)]
pub struct PutArgs {
    /// Files or directories to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// KMS key id, alias or ARN used to encrypt the files
    #[arg(short, long, env = "AWS_KMS_ID")]
    pub kms: Option<String>,

    /// Bucket path to upload the files under
    #[arg(short, long, conflicts_with = "flatten")]
    pub path: Option<String>,

    /// Upload every file to the bucket root using only its name
    #[arg(long)]
    pub flatten: bool,
}

/// Key a local file is uploaded under.
///
/// With `path` the file name goes below that path; with `flatten` it goes to
/// the bucket root; otherwise the file's own relative path is kept. The
/// suffix is appended unless the name already carries it.
pub fn upload_key(file: &Path, path: Option<&str>, flatten: bool, suffix: &str) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut key = match path.map(normalize_prefix) {
        Some(prefix) if !prefix.is_empty() => {
            format!("{}{}{}", prefix.trim_end_matches(SEPARATOR), SEPARATOR, name)
        }
        _ if flatten || path.is_some() => name,
        _ => {
            let relative: Vec<String> = file
                .components()
                .filter_map(|c| match c {
                    std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            relative.join("/")
        }
    };

    if !is_encrypted(&key, suffix) {
        key.push_str(suffix);
    }
    key
}

/// Expand directories into the regular files below them, in name order.
pub fn expand(paths: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        collect(path, &mut files)?;
    }
    Ok(files)
}

fn collect(path: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    if !fs::metadata(path)?.is_dir() {
        files.push(path.to_path_buf());
        return Ok(());
    }
    let mut entries = fs::read_dir(path)?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    for entry in entries {
        collect(&entry, files)?;
    }
    Ok(())
}

/// Encrypt and upload every file.
pub async fn execute(ctx: &Context, args: PutArgs) -> Result<()> {
    ctx.store.require_bucket()?;
    let files = expand(&args.files)?;

    // already-encrypted files need no key
    let needs_kms = files.iter().any(|f| !is_encrypted(&f.to_string_lossy(), &ctx.suffix));
    let kms_id = match args.kms.as_deref() {
        Some(id) if !id.is_empty() => Some(id),
        _ if needs_kms => return Err(ConfigError::MissingKmsKey.into()),
        _ => None,
    };

    let remote = Remote::connect(&ctx.store).await?;

    for file in &files {
        let key = upload_key(file, args.path.as_deref(), args.flatten, &ctx.suffix);
        let content = Zeroizing::new(fs::read(file)?);

        let body = match kms_id {
            Some(id) if !is_encrypted(&file.to_string_lossy(), &ctx.suffix) => {
                debug!(file = %file.display(), len = content.len(), "encrypting");
                remote.kms.encrypt(id, &content).await.map_err(|e| {
                    Error::Remote(RemoteError::new(format!(
                        "failed to encrypt {}: {}",
                        file.display(),
                        e
                    )))
                })?
            }
            _ => content.to_vec(),
        };

        remote.store.put(&key, body).await.map_err(|e| {
            Error::Remote(RemoteError::new(format!("failed to upload {}: {}", key, e)))
        })?;

        info!(
            action = "put",
            bucket = %remote.store.bucket(),
            key = %key,
            file = %file.display(),
            "uploaded the file"
        );
        output::success(&format!("{} → {}", file.display(), output::path(&key)));
    }
    Ok(())
}
