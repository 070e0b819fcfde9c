//! Path filter.
//!
//! The store is listed by prefix only; depth is a client-side decision. A key
//! is accepted when it lives under the prefix, satisfies the depth rule and
//! matches the user's regex.
//!
//! Depth rule: with `recursive` off, the remainder of the key after the prefix
//! (ignoring one separator directly after it) must not contain another
//! separator, i.e. only direct children match.

use regex::Regex;

use crate::core::constants::SEPARATOR;
use crate::core::domain::SyncTarget;
use crate::error::SyncError;

/// Normalize a user-supplied path into a listing prefix.
///
/// Strips a leading separator and maps a bare `/` or `.` to the empty prefix,
/// meaning the whole bucket.
pub fn normalize_prefix(path: &str) -> String {
    let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
    if path.is_empty() || path == "/" || path == "." {
        return String::new();
    }
    path.to_string()
}

/// Compile a key filter.
///
/// # Errors
///
/// Returns `SyncError::InvalidFilter` when the pattern does not compile.
pub fn compile_pattern(pattern: &str) -> Result<Regex, SyncError> {
    Regex::new(pattern).map_err(|e| SyncError::InvalidFilter {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Compiled matching predicate for one prefix.
#[derive(Debug, Clone)]
pub struct PathFilter {
    prefix: String,
    recursive: bool,
    pattern: Regex,
}

impl PathFilter {
    pub fn new(path: &str, recursive: bool, pattern: &str) -> Result<Self, SyncError> {
        Ok(Self {
            prefix: normalize_prefix(path),
            recursive,
            pattern: compile_pattern(pattern)?,
        })
    }

    pub fn for_target(target: &SyncTarget) -> Result<Self, SyncError> {
        Self::new(&target.prefix, target.recursive, &target.pattern)
    }

    /// The normalized prefix handed to the lister.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// Whether a listed key is accepted by both the depth rule and the regex.
    pub fn matches(&self, key: &str) -> bool {
        self.matches_depth(key) && self.pattern.is_match(key)
    }

    fn matches_depth(&self, key: &str) -> bool {
        let Some(remainder) = key.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if self.recursive {
            return true;
        }
        let remainder = remainder.strip_prefix(SEPARATOR).unwrap_or(remainder);
        // a directory marker for a direct child ("dir/") is still a direct child
        let remainder = remainder.strip_suffix(SEPARATOR).unwrap_or(remainder);
        !remainder.contains(SEPARATOR)
    }
}
