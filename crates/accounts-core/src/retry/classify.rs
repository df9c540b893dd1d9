//! Classify attempt outcomes (status codes, transport errors) into retry kinds.

use crate::retry::policy::ErrorKind;
use crate::transport::{Response, TransportError};

/// Retry if and only if the status is 429 or above.
pub fn classify_http_status(status: u16) -> ErrorKind {
    match status {
        429 => ErrorKind::Throttled,
        s if s > 429 => ErrorKind::Retryable(s),
        _ => ErrorKind::Terminal,
    }
}

/// Only timeout-class transport errors are retried.
pub fn classify_transport_error(e: &TransportError) -> ErrorKind {
    if e.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::Fatal
    }
}

/// Classify the outcome of one attempt.
pub fn classify(outcome: &Result<Response, TransportError>) -> ErrorKind {
    match outcome {
        Ok(response) => classify_http_status(response.status),
        Err(e) => classify_transport_error(e),
    }
}
