use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller passed something unusable, e.g. an id that is not a UUID.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("validation error: {0}")]
    Validation(String),
    /// Storage unreachable or the operation failed. Not retried.
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn invalid_id(raw: &str) -> Self { Self::InvalidArgument(format!("malformed id: {raw:?}")) }
}
