use anyhow::{Context, Result};

pub const ENV_CLIENT_ID: &str = "CONTENT_API_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CONTENT_API_CLIENT_SECRET";
pub const ENV_OUTPUT_BUCKET: &str = "OUTPUT_BUCKET";

/// Everything the collector needs from the environment. Core components
/// never read env vars themselves; the binary loads this once and wires the
/// pieces together.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub client_id: String,
    pub client_secret: String,
    pub bucket: String,
}

impl CollectorConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: require(ENV_CLIENT_ID)?,
            client_secret: require(ENV_CLIENT_SECRET)?,
            bucket: require(ENV_OUTPUT_BUCKET)?,
        })
    }
}

/// Everything the transformer needs from the environment.
#[derive(Debug, Clone)]
pub struct TransformerConfig {
    pub bucket: String,
}

impl TransformerConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self { bucket: require(ENV_OUTPUT_BUCKET)? })
    }
}

fn require(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required environment variable {key}"))
}
