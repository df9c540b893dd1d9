//! Translate terminal non-success responses into typed errors.
//!
//! The classifier walks an immutable, ordered list of [`StatusRule`]s and
//! applies the first whose status matches. 400 and 403 decode a JSON error
//! body; every other documented status maps to a fixed message; anything
//! else falls through to the "uncovered status code" rule. A body that fails
//! to decode yields `status code <N>: <decode error>` rather than a panic.
//!
//! The client never classifies on its own: callers decide which statuses are
//! acceptable outcomes and classify the rest.

mod body;
mod error;
mod rules;

pub use error::{ClassifiedError, ErrorCategory};
pub use rules::{
    canonical_rules, BodyShape, StatusMatch, StatusRule, BAD_GATEWAY_MESSAGE, CONFLICT_MESSAGE,
    GATEWAY_TIMEOUT_MESSAGE, INTERNAL_SERVER_ERROR_MESSAGE, METHOD_NOT_ALLOWED_MESSAGE,
    NOT_ACCEPTABLE_MESSAGE, NOT_FOUND_MESSAGE, SERVICE_UNAVAILABLE_MESSAGE,
    TOO_MANY_REQUESTS_MESSAGE, UNAUTHORIZED_MESSAGE, UNCOVERED_MESSAGE, UNCOVERED_RULE,
};

use crate::transport::Response;

/// Classification capability, so callers can substitute a fake.
pub trait Classify: Send + Sync {
    fn classify(&self, response: &Response) -> ClassifiedError;
}

/// First-match-wins rule chain.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    rules: Vec<StatusRule>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusClassifier {
    /// Classifier over the canonical rule table.
    pub fn new() -> Self {
        Self {
            rules: canonical_rules(),
        }
    }

    /// Classifier over custom rules. The uncovered fallback still applies when
    /// nothing matches.
    pub fn with_rules(rules: Vec<StatusRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[StatusRule] {
        &self.rules
    }

    fn rule_for(&self, status: u16) -> &StatusRule {
        self.rules
            .iter()
            .find(|r| r.status.matches(status))
            .unwrap_or(&UNCOVERED_RULE)
    }
}

impl Classify for StatusClassifier {
    fn classify(&self, response: &Response) -> ClassifiedError {
        let rule = self.rule_for(response.status);
        let decoded = match rule.body {
            BodyShape::None => Ok(rule.message.to_string()),
            BodyShape::CodeMessageJson => body::code_message(&response.body),
            BodyShape::TypeDescriptionJson => body::type_description(&response.body),
        };
        let (detail, body_decode_failed) = match decoded {
            Ok(detail) => (detail, false),
            Err(e) => {
                tracing::debug!(
                    status = response.status,
                    category = %rule.category,
                    "error body did not decode: {}",
                    e
                );
                (e.to_string(), true)
            }
        };
        ClassifiedError {
            status_code: response.status,
            category: rule.category,
            detail,
            body_decode_failed,
        }
    }
}
