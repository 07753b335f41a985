//! Error type surfaced by the certificate service.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Rejected input; nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error("Certificate {0} not found")]
    NotFound(i64),

    /// Filesystem or serialization failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
