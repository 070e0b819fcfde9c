//! File materializer.
//!
//! Turns a remote key into a local path under the output directory and
//! writes plaintext there. Writes go to a temporary file in the destination
//! directory which is then renamed into place, so readers never observe a
//! truncated secret. In dry-run mode content goes to stdout and the
//! filesystem is left alone.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::core::cipher::Plaintext;
use crate::core::constants::{DIR_MODE, SEPARATOR};
use crate::core::pipeline::plaintext_name;
use crate::error::SyncError;

/// Plaintext content bound for a local path.
pub struct MaterializedFile {
    pub destination: PathBuf,
    pub content: Plaintext,
}

impl std::fmt::Debug for MaterializedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedFile")
            .field("destination", &self.destination)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Local path a key materializes to.
///
/// `flatten` keeps only the file name; otherwise the key's full relative
/// path is recreated. The encryption suffix is stripped either way. Empty,
/// `.` and `..` segments are dropped so a key can never escape `output_dir`.
///
/// Returns `None` when the key names no file: its last segment, once the
/// suffix is stripped, is empty, `.` or `..` (`.encrypted`, `a/.encrypted`,
/// `a/..`). Such a key would otherwise resolve to a directory.
pub fn destination_path(
    output_dir: &Path,
    key: &str,
    flatten: bool,
    suffix: &str,
) -> Option<PathBuf> {
    let key = plaintext_name(key, suffix);
    let file_name = key.rsplit(SEPARATOR).next().unwrap_or_default();
    if !is_normal(file_name) {
        return None;
    }

    let mut path = output_dir.to_path_buf();
    if flatten {
        path.push(file_name);
    } else {
        path.extend(key.split(SEPARATOR).filter(|s| is_normal(s)));
    }
    Some(path)
}

fn is_normal(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Create a directory and its parents.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// Writes materialized files to disk or, in dry-run mode, to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Materializer {
    dry_run: bool,
    file_mode: u32,
}

impl Materializer {
    pub fn new(dry_run: bool, file_mode: u32) -> Self {
        Self { dry_run, file_mode }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write a file according to the mode.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::WriteFailed` naming the destination.
    pub fn write(&self, file: &MaterializedFile) -> Result<(), SyncError> {
        if self.dry_run {
            let stdout = io::stdout();
            let mut sink = stdout.lock();
            return self.write_to(&mut sink, file);
        }
        self.write_atomic(file).map_err(|e| failed(file, e))
    }

    /// Dry-run output: the content, as-is, to an arbitrary sink.
    pub fn write_to(&self, sink: &mut impl Write, file: &MaterializedFile) -> Result<(), SyncError> {
        trace!(destination = %file.destination.display(), "dry run, writing to stdout");
        sink.write_all(&file.content)
            .and_then(|_| sink.flush())
            .map_err(|e| failed(file, e))
    }

    fn write_atomic(&self, file: &MaterializedFile) -> io::Result<()> {
        let parent = match file.destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        ensure_dir(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(&file.content)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(self.file_mode))?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&file.destination).map_err(|e| e.error)?;

        debug!(
            destination = %file.destination.display(),
            len = file.content.len(),
            "wrote file"
        );
        Ok(())
    }
}

fn failed(file: &MaterializedFile, err: io::Error) -> SyncError {
    SyncError::WriteFailed {
        path: file.destination.clone(),
        reason: err.to_string(),
    }
}
