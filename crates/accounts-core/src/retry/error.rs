//! Errors surfaced by the retry engine.

use crate::transport::TransportError;

/// Why a send produced no response.
///
/// Retryable statuses are never turned into errors here: once retries are
/// spent, the last response is returned as-is.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// No request was supplied.
    #[error("nil request")]
    NilRequest,
    /// The cancel token fired before the first attempt.
    #[error("request cancelled before the first attempt")]
    Cancelled,
    /// Fatal transport error, or the last timeout once retries are spent.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SendError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Transport(e) if e.is_timeout())
    }
}
