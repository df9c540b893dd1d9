//! Single-attempt HTTP transport.
//!
//! A [`Transport`] performs exactly one exchange and reports either a fully
//! buffered [`Response`] or a [`TransportError`]. Retrying is the job of
//! [`crate::retry::RetryEngine`]; the production transport is
//! [`CurlTransport`].

mod libcurl;
mod pool;

pub use libcurl::CurlTransport;
pub use pool::{ConnectionPool, PoolLimits};

use crate::request::Request;

/// A buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Connection-level failure of a single attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// libcurl reported an error.
    #[error("{0}")]
    Curl(#[from] ::curl::Error),
    /// The attempt exceeded its deadline.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Any other failure (refused, DNS, malformed request).
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Timeout-class errors are the only transport errors worth retrying.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Curl(e) => e.is_operation_timedout(),
            TransportError::Timeout(_) => true,
            TransportError::Other(_) => false,
        }
    }
}

/// Send-once capability. Implementations must be safe to share across threads.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}
