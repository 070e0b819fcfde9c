//! Type aliases for domain concepts.

/// Full path-like key of an object in the bucket (e.g. `compute/db.encrypted`).
pub type ObjectKey = String;

/// Opaque content identity of an object (the S3 ETag).
///
/// Only ever compared for equality; it changes iff the content changes.
pub type Fingerprint = String;
