//! In-memory object store and KMS.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use s3secrets::core::cipher::{KeyAlias, Kms, Plaintext};
use s3secrets::core::domain::RemoteObject;
use s3secrets::core::store::ObjectStore;
use s3secrets::error::RemoteError;
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

/// Prefix the fake KMS puts on its "ciphertext".
pub const CIPHER_TAG: &[u8] = b"kms:";

/// Encrypt the way [`FakeKms`] expects.
pub fn seal(plaintext: &[u8]) -> Vec<u8> {
    let mut out = CIPHER_TAG.to_vec();
    out.extend(plaintext.iter().rev());
    out
}

#[derive(Debug, Clone)]
struct Entry {
    body: Vec<u8>,
    etag: String,
}

/// Bucket held in memory. Every write produces a new fingerprint.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Entry>>,
    version: AtomicU64,
    listings: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    fail_list: AtomicBool,
    fail_fetch: Mutex<HashSet<String>>,
    fail_delete: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a plain object.
    pub fn insert(&self, key: &str, body: &[u8]) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            Entry {
                body: body.to_vec(),
                etag: format!("\"v{}\"", version),
            },
        );
    }

    /// Store a plaintext sealed by the fake KMS.
    pub fn insert_sealed(&self, key: &str, plaintext: &[u8]) {
        self.insert(key, &seal(plaintext));
    }

    /// Store a zero-length directory marker.
    pub fn insert_marker(&self, key: &str) {
        self.insert(key, b"");
    }

    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|e| e.body.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    /// Keys fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn clear_fetched(&self) {
        self.fetched.lock().unwrap().clear();
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetch(&self, key: &str, fail: bool) {
        toggle(&self.fail_fetch, key, fail);
    }

    pub fn fail_delete(&self, key: &str, fail: bool) {
        toggle(&self.fail_delete, key, fail);
    }
}

fn toggle(keys: &Mutex<HashSet<String>>, key: &str, on: bool) {
    let mut keys = keys.lock().unwrap();
    if on {
        keys.insert(key.to_string());
    } else {
        keys.remove(key);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        "memory"
    }

    async fn list(&self, prefix: &str) -> Result<Vec<RemoteObject>, RemoteError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RemoteError::new("AccessDenied: listing disabled"));
        }
        // reverse order: callers must not rely on the store sorting
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, e)| RemoteObject::new(key.clone(), e.etag.clone(), e.body.len() as u64, None))
            .collect())
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, RemoteError> {
        self.fetched.lock().unwrap().push(key.to_string());
        if self.fail_fetch.lock().unwrap().contains(key) {
            return Err(RemoteError::new("SlowDown: please reduce your request rate"));
        }
        self.body(key)
            .ok_or_else(|| RemoteError::new(format!("NoSuchKey: {}", key)))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), RemoteError> {
        self.insert(key, &body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        if self.fail_delete.lock().unwrap().contains(key) {
            return Err(RemoteError::new(format!("AccessDenied: {}", key)));
        }
        self.remove(key);
        Ok(())
    }
}

/// KMS that reverses bytes behind a tag. Rejects untagged ciphertext.
///
/// Optionally cancels a token while decrypting a chosen ciphertext, to
/// simulate a signal arriving mid-cycle.
#[derive(Default)]
pub struct FakeKms {
    decrypts: AtomicUsize,
    cancel_on: Mutex<Option<(Vec<u8>, CancellationToken)>>,
    aliases: Mutex<Vec<KeyAlias>>,
}

impl FakeKms {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn decrypts(&self) -> usize {
        self.decrypts.load(Ordering::SeqCst)
    }

    pub fn add_alias(&self, name: &str, target_key_id: Option<&str>) {
        self.aliases.lock().unwrap().push(KeyAlias {
            name: name.to_string(),
            target_key_id: target_key_id.map(str::to_string),
        });
    }

    /// Cancel `token` when `plaintext` is decrypted.
    pub fn cancel_on(&self, plaintext: &[u8], token: CancellationToken) {
        *self.cancel_on.lock().unwrap() = Some((plaintext.to_vec(), token));
    }
}

#[async_trait]
impl Kms for FakeKms {
    async fn encrypt(&self, _key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, RemoteError> {
        Ok(seal(plaintext))
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Plaintext, RemoteError> {
        self.decrypts.fetch_add(1, Ordering::SeqCst);
        let body = ciphertext
            .strip_prefix(CIPHER_TAG)
            .ok_or_else(|| RemoteError::new("InvalidCiphertextException"))?;
        let plaintext: Vec<u8> = body.iter().rev().copied().collect();

        if let Some((trigger, token)) = self.cancel_on.lock().unwrap().as_ref() {
            if *trigger == plaintext {
                token.cancel();
            }
        }
        Ok(Zeroizing::new(plaintext))
    }

    async fn list_aliases(&self) -> Result<Vec<KeyAlias>, RemoteError> {
        Ok(self.aliases.lock().unwrap().clone())
    }

    fn name(&self) -> &'static str {
        "fake-kms"
    }
}
