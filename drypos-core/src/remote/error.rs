//! Remote service error types.

use thiserror::Error;

/// Errors returned by a [`RemoteSource`](super::RemoteSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Service unreachable, timed out, or failing with a server error
    #[error("Remote service unavailable: {0}")]
    Unavailable(String),

    /// Credentials missing, expired or refused
    #[error("Remote authentication failed: {0}")]
    Auth(String),

    /// Service answered but refused the request
    #[error("Remote service rejected the request: {0}")]
    Rejected(String),

    /// Response body could not be decoded
    #[error("Malformed response from remote service: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// True when retrying later with the same credentials could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_))
    }
}
