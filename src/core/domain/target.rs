//! Sync target type.

use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_FILTER;

/// One requested path argument and how to materialize what lives under it.
///
/// Immutable for the duration of a run. `prefix` is kept as supplied; the
/// path filter normalizes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTarget {
    pub prefix: String,
    pub recursive: bool,
    pub flatten: bool,
    pub pattern: String,
}

impl SyncTarget {
    /// Target a prefix with the default filter, non-recursive, keeping hierarchy.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            recursive: false,
            flatten: false,
            pattern: DEFAULT_FILTER.to_string(),
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}
