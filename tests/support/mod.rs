//! Test support utilities for s3secrets integration tests.
//!
//! Provides an isolated CLI environment plus in-memory object store and KMS
//! fakes for driving the sync pipeline without AWS.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fakes;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fakes::*;

use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Child processes use `.current_dir()` so tests can run in parallel.
pub struct Test {
    /// Working directory of the command under test
    pub dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Write a file relative to the working directory.
    pub fn write(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }
}
