use thiserror::Error;

/// Discriminant for [`PipelineError`]. Callers that only care about the
/// failure class (missing input, bad input, bad shape, external call) match
/// on this instead of the full variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Parse,
    Validation,
    Transport,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no objects found in bucket {bucket} with prefix {prefix}")]
    NotFound { bucket: String, prefix: String },
    #[error("failed to parse object {key}: {reason}")]
    Parse { key: String, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{context}: {message}")]
    Transport { context: String, message: String },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotFound { .. } => ErrorKind::NotFound,
            PipelineError::Parse { .. }
            | PipelineError::Json(_)
            | PipelineError::Csv(_)
            | PipelineError::Io(_) => ErrorKind::Parse,
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Wrap an external-service failure, keeping only its display text.
    /// SDK error types stay out of the public error surface.
    pub fn transport(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        PipelineError::Transport { context: context.into(), message: err.to_string() }
    }
}
