use thiserror::Error;

/// Errors surfaced by a [`CallbackStore`](crate::store::CallbackStore)
/// implementation.
///
/// The HTTP layer maps these onto status codes and envelope error codes:
/// `NotFound` to 404/40400, `InvalidRequest` to 400/40000 and `Unavailable`
/// to 500/50000.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Referenced file, version or user does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Request carried missing or inconsistent parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Backing system failed or is unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
