//! The rule table. Order matters: the first matching rule wins.

use super::error::ErrorCategory;

pub const UNAUTHORIZED_MESSAGE: &str = "invalid request signature or access token";
pub const NOT_FOUND_MESSAGE: &str =
    "not found: trying to access an endpoint or resource that does not exist";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "trying to access an endpoint that exists using a method that is not supported by the target resource";
pub const NOT_ACCEPTABLE_MESSAGE: &str = "trying to access content with an incorrect content type specific in the request header";
pub const CONFLICT_MESSAGE: &str = "resource has already been created. It is safe to ignore this error message and continue processing. Returned for DELETE calls when an incorrect version has been specified";
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "the rate limit for requests per second has been exceeded, or the resource is still being synchronised. Wait, then retry later";
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "an internal error occurs or the request times out. This is safe to retry after waiting a short amount of time";
pub const BAD_GATEWAY_MESSAGE: &str = "there is a temporary internal networking problem. This is safe to retry after waiting a short amount of time";
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "service is temporarily overloaded. This is safe to retry after waiting a short amount of time";
pub const GATEWAY_TIMEOUT_MESSAGE: &str = BAD_GATEWAY_MESSAGE;
pub const UNCOVERED_MESSAGE: &str = "uncovered status code for this request";

/// Which status codes a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatch {
    Exact(u16),
    Any,
}

impl StatusMatch {
    pub fn matches(self, status: u16) -> bool {
        match self {
            StatusMatch::Exact(code) => code == status,
            StatusMatch::Any => true,
        }
    }
}

/// How the response body contributes to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// Body ignored; the rule's fixed message is used.
    None,
    /// `{"error_code", "error_message"}`.
    CodeMessageJson,
    /// `{"error", "error_description"}`.
    TypeDescriptionJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    pub status: StatusMatch,
    pub category: ErrorCategory,
    pub body: BodyShape,
    /// Used when `body` is [`BodyShape::None`].
    pub message: &'static str,
}

impl StatusRule {
    pub const fn fixed(code: u16, category: ErrorCategory, message: &'static str) -> Self {
        Self {
            status: StatusMatch::Exact(code),
            category,
            body: BodyShape::None,
            message,
        }
    }

    pub const fn decoded(code: u16, category: ErrorCategory, body: BodyShape) -> Self {
        Self {
            status: StatusMatch::Exact(code),
            category,
            body,
            message: "",
        }
    }
}

/// Always-matching last resort.
pub const UNCOVERED_RULE: StatusRule = StatusRule {
    status: StatusMatch::Any,
    category: ErrorCategory::Uncovered,
    body: BodyShape::None,
    message: UNCOVERED_MESSAGE,
};

/// The accounts API's documented error statuses, ending with the fallback.
pub fn canonical_rules() -> Vec<StatusRule> {
    use ErrorCategory as C;
    vec![
        StatusRule::decoded(400, C::BadRequest, BodyShape::CodeMessageJson),
        StatusRule::fixed(401, C::Unauthorized, UNAUTHORIZED_MESSAGE),
        StatusRule::decoded(403, C::Forbidden, BodyShape::TypeDescriptionJson),
        StatusRule::fixed(404, C::NotFound, NOT_FOUND_MESSAGE),
        StatusRule::fixed(405, C::MethodNotAllowed, METHOD_NOT_ALLOWED_MESSAGE),
        StatusRule::fixed(406, C::NotAcceptable, NOT_ACCEPTABLE_MESSAGE),
        StatusRule::fixed(409, C::Conflict, CONFLICT_MESSAGE),
        StatusRule::fixed(429, C::TooManyRequests, TOO_MANY_REQUESTS_MESSAGE),
        StatusRule::fixed(500, C::InternalServerError, INTERNAL_SERVER_ERROR_MESSAGE),
        StatusRule::fixed(502, C::BadGateway, BAD_GATEWAY_MESSAGE),
        StatusRule::fixed(503, C::ServiceUnavailable, SERVICE_UNAVAILABLE_MESSAGE),
        StatusRule::fixed(504, C::GatewayTimeout, GATEWAY_TIMEOUT_MESSAGE),
        UNCOVERED_RULE,
    ]
}
