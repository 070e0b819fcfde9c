//! Change detection.
//!
//! The cache maps a key to the fingerprint of the content last written for
//! it. It lives for one run only; a restart re-examines every object.

use std::collections::HashMap;

use crate::core::domain::RemoteObject;
use crate::core::types::{Fingerprint, ObjectKey};

/// Last-materialized fingerprint per key.
#[derive(Debug, Default, Clone)]
pub struct ChangeCache {
    entries: HashMap<ObjectKey, Fingerprint>,
}

impl ChangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint recorded for a key, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Record a successful write. Directory markers are never recorded.
    pub fn record(&mut self, object: &RemoteObject) {
        if object.is_directory_marker {
            return;
        }
        self.entries
            .insert(object.key.clone(), object.fingerprint.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether an object has to be fetched this cycle.
///
/// False for directory markers and for objects whose fingerprint matches the
/// cache; true for new keys and changed content.
pub fn needs_fetch(object: &RemoteObject, cache: &ChangeCache) -> bool {
    if object.is_directory_marker {
        return false;
    }
    cache.get(&object.key) != Some(object.fingerprint.as_str())
}
