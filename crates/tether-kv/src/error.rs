use thiserror::Error;

/// Error type for KV operations
#[derive(Debug, Error)]
pub enum KvError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A write would grow the store past its quota
    #[error("Quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Compression or base64 failure
    #[error("Codec error: {0}")]
    Codec(String),
}

/// Result type for KV operations
pub type KvResult<T> = Result<T, KvError>;
