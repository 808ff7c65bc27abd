use thiserror::Error;

/// Result type returned by collaborator implementations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures reported by catalog, snapshot and order collaborators.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,
    /// The collaborator rejected the caller's credentials.
    #[error("request was not authorized")]
    Unauthorized,
    /// The remote side could not be reached or refused the request.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// The remote side refused the payload.
    #[error("request rejected: {0}")]
    Rejected(String),
    /// Local file access failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored or received JSON could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A snapshot key contains characters a store cannot accept.
    #[error("invalid snapshot key `{0}`")]
    InvalidKey(String),
    /// A catalog import could not be parsed.
    #[error("catalog import failed: {0}")]
    Import(String),
}
