use thiserror::Error;

/// Errors from the durable transcript cache.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("malformed cached transcript: {0}")]
    Malformed(String),
}
