use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::PipelineError;
use crate::source::ContentSource;
use crate::store::BlobStore;
use crate::types::{record_from_post, LabeledRecord};

/// Prefix every raw snapshot is written under. The transformer lists this
/// prefix to find its input.
pub const RAW_DATA_PREFIX: &str = "raw_data/reddit/";

pub const DEFAULT_CATEGORY: &str = "technology";
pub const DEFAULT_LIMIT: u32 = 100;

/// Timestamp segment of every object key, e.g. `20240501_120000`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Outcome of one collection run.
#[derive(Debug, Clone)]
pub struct CollectSummary {
    pub key: String,
    pub posts_collected: usize,
}

/// Pulls one batch of hot posts and snapshots it to the blob store. The
/// batch is written as a single object: either every fetched post lands, or
/// nothing does.
pub struct Collector {
    source: Arc<dyn ContentSource>,
    store: Arc<dyn BlobStore>,
    bucket: String,
    category: String,
    limit: u32,
}

impl Collector {
    pub fn new(
        source: Arc<dyn ContentSource>,
        store: Arc<dyn BlobStore>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            bucket: bucket.into(),
            category: DEFAULT_CATEGORY.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Fetch, label, and store one snapshot. Posts are kept in the ranking
    /// order the API returned, with no filtering or deduplication. Nothing
    /// is caught here: fetch and store failures propagate to the scheduler
    /// that invoked the run.
    pub async fn run(&self) -> Result<CollectSummary, PipelineError> {
        let posts = self.source.fetch_hot(&self.category, self.limit).await?;
        let records: Vec<LabeledRecord> = posts.iter().map(record_from_post).collect();
        let body = serde_json::to_vec(&records)?;
        let key = raw_data_key(Utc::now());
        self.store
            .put(&self.bucket, &key, body, Some("application/json"))
            .await?;
        info!(key = %key, count = records.len(), "stored raw snapshot");
        Ok(CollectSummary { key, posts_collected: records.len() })
    }
}

/// Key for a snapshot taken at `at`.
pub fn raw_data_key(at: DateTime<Utc>) -> String {
    format!("{RAW_DATA_PREFIX}reddit_data_{}.json", at.format(TIMESTAMP_FORMAT))
}
