use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One post as returned by the content API. `selftext` is empty for link
/// posts, which carry no body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub selftext: String,
}

/// A ranked feed of posts. Implementations authenticate however their
/// backing service requires; auth and rate-limit failures surface as opaque
/// `Transport` errors.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch up to `limit` posts from `category`'s hot ranking, preserving
    /// the service's own ordering.
    async fn fetch_hot(&self, category: &str, limit: u32) -> Result<Vec<Post>, PipelineError>;
}
