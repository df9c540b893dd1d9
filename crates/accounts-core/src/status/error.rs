use std::fmt;

/// Which rule produced a [`ClassifiedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    Conflict,
    TooManyRequests,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    Uncovered,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::BadRequest => "bad request",
            ErrorCategory::Unauthorized => "unauthorized",
            ErrorCategory::Forbidden => "forbidden",
            ErrorCategory::NotFound => "not found",
            ErrorCategory::MethodNotAllowed => "method not allowed",
            ErrorCategory::NotAcceptable => "not acceptable",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::TooManyRequests => "too many requests",
            ErrorCategory::InternalServerError => "internal server error",
            ErrorCategory::BadGateway => "bad gateway",
            ErrorCategory::ServiceUnavailable => "service unavailable",
            ErrorCategory::GatewayTimeout => "gateway timeout",
            ErrorCategory::Uncovered => "uncovered",
        };
        f.write_str(s)
    }
}

/// A terminal non-success response translated into a message.
/// Always renders as `status code <N>: <detail>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status code {status_code}: {detail}")]
pub struct ClassifiedError {
    pub status_code: u16,
    pub category: ErrorCategory,
    pub detail: String,
    /// True when the body did not match the expected JSON shape and `detail`
    /// holds the decode error instead.
    pub body_decode_failed: bool,
}
