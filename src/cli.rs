use clap::{Parser, Subcommand};

/// CLI entry for running either half of the pipeline by hand or from a
/// scheduler.
#[derive(Parser)]
#[command(name = "gleaner")]
#[command(about = "Collects Reddit posts and prepares Comprehend training data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch hot posts and store a raw JSON snapshot
    Collect {
        /// Subreddit to pull from
        #[arg(short, long)]
        category: Option<String>,
        /// Maximum number of posts to fetch
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Reshape the newest snapshot into a training CSV
    Transform,
}
