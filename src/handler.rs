use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::collector::Collector;
use crate::error::PipelineError;
use crate::transformer::Transformer;

/// What one invocation reports back to its scheduler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    /// JSON-encoded payload.
    pub body: String,
}

/// Run one collection. Failures are not intercepted here; the scheduler
/// that invoked the run owns retry policy.
pub async fn handle_collect(collector: &Collector) -> Result<InvocationResponse, PipelineError> {
    let summary = collector.run().await?;
    let body =
        serde_json::to_string(&format!("Collected {} posts from Reddit", summary.posts_collected))?;
    Ok(InvocationResponse { status_code: 200, body })
}

/// Run one transformation. This is the only place transformer errors are
/// intercepted: anything that goes wrong becomes a structured 500 payload
/// carrying the error text.
pub async fn handle_transform(transformer: &Transformer) -> InvocationResponse {
    match transformer.run().await {
        Ok(summary) => {
            let body = json!({
                "message": "Data processed successfully for Comprehend",
                "output_file": summary.output_key,
                "entries_processed": summary.entries_processed,
            });
            InvocationResponse { status_code: 200, body: body.to_string() }
        }
        Err(err) => {
            error!(kind = ?err.kind(), %err, "transform failed");
            let body = json!({
                "error": err.to_string(),
                "message": "Error processing data for Comprehend",
            });
            InvocationResponse { status_code: 500, body: body.to_string() }
        }
    }
}
