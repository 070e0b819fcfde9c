//! Remote object type.
//!
//! A listing entry as returned by the object store, tagged with the content
//! fingerprint used for change detection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::constants::SEPARATOR;
use crate::core::types::{Fingerprint, ObjectKey};

/// An object (or directory marker) listed from the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteObject {
    pub key: ObjectKey,
    pub fingerprint: Fingerprint,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub is_directory_marker: bool,
}

impl RemoteObject {
    /// Create a listing entry, classifying zero-length keys ending in `/` as
    /// directory markers.
    pub fn new(
        key: impl Into<ObjectKey>,
        fingerprint: impl Into<Fingerprint>,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let key = key.into();
        let is_directory_marker = key.ends_with(SEPARATOR) && size == 0;
        Self {
            key,
            fingerprint: fingerprint.into(),
            size,
            last_modified,
            is_directory_marker,
        }
    }
}

impl std::fmt::Display for RemoteObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}
