use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gleaner::cli::{Cli, Commands};
use gleaner::collector::Collector;
use gleaner::config::{CollectorConfig, TransformerConfig};
use gleaner::handler;
use gleaner::reddit::RedditSource;
use gleaner::s3::S3Store;
use gleaner::transformer::Transformer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Collect { category, limit } => {
            let config = CollectorConfig::from_env()?;
            let source = Arc::new(RedditSource::new(config.client_id, config.client_secret)?);
            let store = Arc::new(S3Store::from_env().await);
            let mut collector = Collector::new(source, store, config.bucket);
            if let Some(category) = category {
                collector = collector.with_category(category);
            }
            if let Some(limit) = limit {
                collector = collector.with_limit(limit);
            }
            let response = handler::handle_collect(&collector).await?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Commands::Transform => {
            let config = TransformerConfig::from_env()?;
            let store = Arc::new(S3Store::from_env().await);
            let transformer = Transformer::new(store, config.bucket);
            let response = handler::handle_transform(&transformer).await;
            println!("{}", serde_json::to_string(&response)?);
        }
    }
    Ok(())
}
