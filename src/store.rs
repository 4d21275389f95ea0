use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PipelineError;

/// Metadata for one stored object, as returned by a listing. `last_modified`
/// is only used to order objects when picking the newest snapshot.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub key: String,
    pub last_modified: DateTime<Utc>,
}

/// Object storage addressed by bucket + key. Writes are single atomic puts;
/// there is no transactional discipline across calls.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, PipelineError>;
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PipelineError>;
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), PipelineError>;
}

struct StoredBlob {
    bytes: Vec<u8>,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

/// In-process store for tests and local dry runs.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredBlob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit modification time, so tests can
    /// arrange which snapshot counts as newest.
    pub fn put_at(&self, bucket: &str, key: &str, bytes: Vec<u8>, last_modified: DateTime<Utc>) {
        let mut objects = self.objects.lock().unwrap();
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob { bytes, content_type: None, last_modified },
        );
    }

    pub fn content_type_of(&self, bucket: &str, key: &str) -> Option<String> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .and_then(|blob| blob.content_type.clone())
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.lock().unwrap();
        let mut keys: Vec<String> = objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, PipelineError> {
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), blob)| ObjectMeta { key: k.clone(), last_modified: blob.last_modified })
            .collect())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PipelineError> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| PipelineError::transport("getting object", format!("no such key: {key}")))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), PipelineError> {
        let mut objects = self.objects.lock().unwrap();
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob {
                bytes,
                content_type: content_type.map(str::to_string),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }
}
