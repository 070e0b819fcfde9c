//! Object lister.
//!
//! One store call per prefix. The result is sorted by key and repeated
//! directory markers are collapsed, since a store may report the same prefix
//! several times when it holds nested prefixes.

use std::collections::HashSet;

use tracing::debug;

use crate::core::domain::RemoteObject;
use crate::core::store::ObjectStore;
use crate::error::SyncError;

/// List the objects under a prefix, ordered by key.
///
/// # Errors
///
/// Returns `SyncError::ListFailed` carrying the store's error unchanged.
pub async fn list_objects(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<RemoteObject>, SyncError> {
    let listed = store
        .list(prefix)
        .await
        .map_err(|e| SyncError::ListFailed {
            bucket: store.bucket().to_string(),
            prefix: prefix.to_string(),
            reason: e.to_string(),
        })?;

    let total = listed.len();
    let mut seen_dirs = HashSet::new();
    let mut objects: Vec<RemoteObject> = listed
        .into_iter()
        .filter(|o| !o.is_directory_marker || seen_dirs.insert(o.key.clone()))
        .collect();
    objects.sort_by(|a, b| a.key.cmp(&b.key));

    debug!(
        prefix = %prefix,
        total,
        kept = objects.len(),
        "classified listing"
    );
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use async_trait::async_trait;

    struct Fixed(std::result::Result<Vec<RemoteObject>, RemoteError>);

    #[async_trait]
    impl ObjectStore for Fixed {
        fn bucket(&self) -> &str {
            "test-bucket"
        }
        async fn list(&self, _prefix: &str) -> std::result::Result<Vec<RemoteObject>, RemoteError> {
            self.0.clone()
        }
        async fn fetch(&self, _key: &str) -> std::result::Result<Vec<u8>, RemoteError> {
            unimplemented!()
        }
        async fn put(&self, _key: &str, _body: Vec<u8>) -> std::result::Result<(), RemoteError> {
            unimplemented!()
        }
        async fn delete(&self, _key: &str) -> std::result::Result<(), RemoteError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_sorted_and_markers_deduplicated() {
        let store = Fixed(Ok(vec![
            RemoteObject::new("compute/z.encrypted", "1", 4, None),
            RemoteObject::new("compute/", "d", 0, None),
            RemoteObject::new("compute/a.encrypted", "2", 4, None),
            RemoteObject::new("compute/", "d", 0, None),
        ]));

        let objects = list_objects(&store, "compute").await.unwrap();
        let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["compute/", "compute/a.encrypted", "compute/z.encrypted"]);
        assert!(objects[0].is_directory_marker);
    }

    #[tokio::test]
    async fn test_store_error_surfaces_as_list_failed() {
        let store = Fixed(Err(RemoteError::new("AccessDenied")));
        let err = list_objects(&store, "etcd").await.unwrap_err();
        assert_eq!(
            err,
            SyncError::ListFailed {
                bucket: "test-bucket".into(),
                prefix: "etcd".into(),
                reason: "AccessDenied".into(),
            }
        );
    }
}
