use async_trait::async_trait;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::store::{BlobStore, ObjectMeta};

/// Blob store backed by S3. One client per process; credentials and region
/// come from the usual provider chain.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let conf = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self { client: Client::new(&conf) }
    }
}

#[async_trait]
impl BlobStore for S3Store {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMeta>, PipelineError> {
        let mut out = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| PipelineError::transport("listing objects", e))?;
            for obj in resp.contents() {
                // Objects the service reports without a key or timestamp
                // cannot be selected anyway.
                let (Some(key), Some(modified)) = (obj.key(), obj.last_modified()) else {
                    continue;
                };
                out.push(ObjectMeta {
                    key: key.to_string(),
                    last_modified: to_chrono(modified),
                });
            }
            match resp.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }
        Ok(out)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, PipelineError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| PipelineError::transport("getting object", e))?;
        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| PipelineError::transport("reading object body", e))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), PipelineError> {
        let mut req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(bytes.into());
        if let Some(ct) = content_type {
            req = req.content_type(ct);
        }
        req.send()
            .await
            .map_err(|e| PipelineError::transport("putting object", e))?;
        Ok(())
    }
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
