use async_trait::async_trait;
use thiserror::Error;

use super::{HistoryLog, Submission};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("History task failed: {0}")]
    Task(String),
}

impl HistoryError {
    /// Convert to HTTP status code for API responses
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Task(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Persisted, ordered log of completed submissions.
///
/// Implementations treat unreadable storage as an empty log and ignore
/// deletion indices outside `0..len`.
#[async_trait]
pub trait HistoryPort: Send + Sync {
    async fn append(&self, submission: Submission) -> Result<(), HistoryError>;

    /// Removes the entry at `index`, returning it, or `None` when the index is
    /// out of range.
    async fn delete(&self, index: usize) -> Result<Option<Submission>, HistoryError>;

    /// Entries in insertion order.
    async fn list(&self) -> Result<HistoryLog, HistoryError>;
}
