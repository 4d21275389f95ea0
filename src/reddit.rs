use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::PipelineError;
use crate::source::{ContentSource, Post};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const USER_AGENT: &str = "MyAPI/0.0.1";

/// Reddit content source using the script-app OAuth flow: the client
/// credentials are exchanged for a bearer token on each fetch. Invocations
/// are short-lived, so no token is cached across them.
pub struct RedditSource {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

// Listing payload, trimmed to the fields the pipeline reads.
#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: Post,
}

impl RedditSource {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PipelineError::transport("building http client", e))?;
        Ok(Self { http, client_id: client_id.into(), client_secret: client_secret.into() })
    }

    async fn access_token(&self) -> Result<String, PipelineError> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PipelineError::transport("requesting reddit token", e))?
            .error_for_status()
            .map_err(|e| PipelineError::transport("requesting reddit token", e))?;
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::transport("decoding reddit token", e))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    async fn fetch_hot(&self, category: &str, limit: u32) -> Result<Vec<Post>, PipelineError> {
        let token = self.access_token().await?;
        let url = format!("{API_BASE}/r/{category}/hot");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| PipelineError::transport("fetching hot posts", e))?
            .error_for_status()
            .map_err(|e| PipelineError::transport("fetching hot posts", e))?;
        let listing: Listing = resp
            .json()
            .await
            .map_err(|e| PipelineError::transport("decoding hot posts", e))?;
        debug!(category, count = listing.data.children.len(), "fetched hot posts");
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }
}
