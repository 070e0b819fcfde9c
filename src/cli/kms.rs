//! KMS command group: encrypt and decrypt local files, list key aliases.
//!
//! Encrypting appends the suffix to each file name, decrypting strips it.
//! The source file is removed once its counterpart is written, unless
//! `--no-delete` or `--dry-run` is given. A dry run prints the result to
//! stdout instead of touching the filesystem.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cli::put::expand;
use crate::cli::{output, Context, OutputFormat};
use crate::core::cipher::{KeyAlias, Kms};
use crate::core::constants::DEFAULT_FILE_MODE;
use crate::core::materialize::{MaterializedFile, Materializer};
use crate::core::pipeline::{is_encrypted, plaintext_name};
use crate::core::remote::connect_kms;
use crate::error::{ConfigError, Error, RemoteError, Result};

#[derive(Subcommand, Debug, Clone)]
pub enum KmsCommand {
    /// Encrypt local files with a KMS key, appending the suffix
    #[command(alias = "en")]
    Encrypt(EncryptArgs),

    /// Decrypt local files carrying the suffix
    #[command(alias = "de")]
    Decrypt(FileArgs),

    /// List the KMS key aliases available
    #[command(alias = "list")]
    Ls,
}

#[derive(Args, Debug, Clone)]
pub struct EncryptArgs {
    /// KMS key id, alias or ARN to encrypt with
    #[arg(short, long, env = "AWS_KMS_ID")]
    pub kms: Option<String>,

    #[command(flatten)]
    pub files: FileArgs,
}

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Files or directories to act on
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Keep the source file after a successful conversion
    #[arg(short = 'N', long)]
    pub no_delete: bool,

    /// Print the result to stdout and leave the filesystem alone
    #[arg(short = 'd', long, alias = "dryrun")]
    pub dry_run: bool,
}

/// Which way a file is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    Encrypt { key_id: &'a str },
    Decrypt,
}

/// Encrypt or decrypt every file, returning the paths written.
///
/// Files already in the target form are passed over: an encrypt skips
/// suffixed files silently, a decrypt warns about unsuffixed ones. Dry-run
/// output goes to `sink`.
pub async fn run(
    kms: &dyn Kms,
    mode: Mode<'_>,
    args: &FileArgs,
    suffix: &str,
    sink: &mut impl Write,
) -> Result<Vec<PathBuf>> {
    let materializer = Materializer::new(args.dry_run, DEFAULT_FILE_MODE);
    let mut written = Vec::new();

    for file in expand(&args.paths)? {
        let Some(destination) = counterpart(&file, mode, suffix) else {
            continue;
        };

        let content = Zeroizing::new(fs::read(&file)?);
        let converted = match mode {
            Mode::Encrypt { key_id } => {
                debug!(file = %file.display(), len = content.len(), "encrypting");
                Zeroizing::new(kms.encrypt(key_id, &content).await.map_err(|e| failed(&file, e))?)
            }
            Mode::Decrypt => {
                debug!(file = %file.display(), len = content.len(), "decrypting");
                kms.decrypt(&content).await.map_err(|e| failed(&file, e))?
            }
        };

        let target = MaterializedFile {
            destination,
            content: converted,
        };
        if materializer.is_dry_run() {
            materializer.write_to(&mut *sink, &target)?;
            continue;
        }
        materializer.write(&target)?;
        info!(
            action = "kms",
            source = %file.display(),
            destination = %target.destination.display(),
            "saved the file"
        );

        if !args.no_delete {
            fs::remove_file(&file).map_err(|e| {
                Error::Remote(RemoteError::new(format!(
                    "failed to delete the original file: {}, error: {}",
                    file.display(),
                    e
                )))
            })?;
        }
        written.push(target.destination);
    }
    Ok(written)
}

/// Path the converted file is written to, or `None` when it is skipped.
fn counterpart(file: &Path, mode: Mode<'_>, suffix: &str) -> Option<PathBuf> {
    let name = file.file_name()?.to_string_lossy();
    match mode {
        Mode::Encrypt { .. } if is_encrypted(&name, suffix) => {
            debug!(file = %file.display(), "already encrypted, skipping");
            None
        }
        Mode::Encrypt { .. } => Some(file.with_file_name(format!("{}{}", name, suffix))),
        Mode::Decrypt if !is_encrypted(&name, suffix) => {
            warn!(
                file = %file.display(),
                suffix,
                "the file does not have the required suffix, skipping"
            );
            None
        }
        Mode::Decrypt => match plaintext_name(&name, suffix) {
            "" => {
                warn!(file = %file.display(), "nothing left once the suffix is stripped, skipping");
                None
            }
            plain => Some(file.with_file_name(plain)),
        },
    }
}

fn failed(file: &Path, err: RemoteError) -> Error {
    Error::Remote(RemoteError::new(format!(
        "failed to convert the file: {}, error: {}",
        file.display(),
        err
    )))
}

/// Aliases that point at a key, in name order.
pub async fn aliases(kms: &dyn Kms) -> Result<Vec<KeyAlias>> {
    let mut aliases: Vec<KeyAlias> = kms
        .list_aliases()
        .await?
        .into_iter()
        .filter(|a| a.target_key_id.is_some())
        .collect();
    aliases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(aliases)
}

pub fn write_aliases(out: &mut impl Write, aliases: &[KeyAlias]) -> std::io::Result<()> {
    for alias in aliases {
        let target = alias.target_key_id.as_deref().unwrap_or_default();
        writeln!(out, "{:<40}{}", alias.name, target)?;
    }
    Ok(())
}

pub async fn execute(ctx: &Context, command: KmsCommand) -> Result<()> {
    match command {
        KmsCommand::Ls => {
            let kms = connect_kms(&ctx.store).await?;
            let aliases = aliases(kms.as_ref()).await?;
            match ctx.format {
                OutputFormat::Json => output::json(&aliases)?,
                OutputFormat::Text => write_aliases(&mut std::io::stdout().lock(), &aliases)?,
            }
            Ok(())
        }
        KmsCommand::Encrypt(args) => {
            let key_id = match args.kms.as_deref() {
                Some(id) if !id.is_empty() => id,
                _ => return Err(ConfigError::MissingKmsKey.into()),
            };
            let kms = connect_kms(&ctx.store).await?;
            let written = run(
                kms.as_ref(),
                Mode::Encrypt { key_id },
                &args.files,
                &ctx.suffix,
                &mut std::io::stdout(),
            )
            .await?;
            report(&written);
            Ok(())
        }
        KmsCommand::Decrypt(args) => {
            let kms = connect_kms(&ctx.store).await?;
            let written = run(
                kms.as_ref(),
                Mode::Decrypt,
                &args,
                &ctx.suffix,
                &mut std::io::stdout(),
            )
            .await?;
            report(&written);
            Ok(())
        }
    }
}

fn report(written: &[PathBuf]) {
    for path in written {
        output::success(&format!("wrote {}", output::path(&path.display().to_string())));
    }
}
