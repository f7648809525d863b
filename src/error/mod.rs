pub mod codes;

use codes::ErrorCode;
use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Validation failures (`InvalidExpression`, `InvalidRuleDefinition`) are
/// always recovered into a structured result (`ValidationResult`,
/// `ruleResults` entries) per the propagation policy. This type only
/// surfaces at the public API boundary when a caller explicitly asked to
/// compile/parse/validate something and wants the failure, or when a rule
/// mutation must be rejected outright. Storage (`Internal`) and
/// `Cancelled` are always fatal to the current call.
#[derive(Debug, Error)]
pub enum SmartUnderwriteError {
    #[error("condition '{fragment}' failed to compile: {reason}")]
    InvalidExpression { fragment: String, reason: String },

    #[error("rule definition invalid: {}", .errors.join("; "))]
    InvalidRuleDefinition { errors: Vec<String> },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("invalid tag: {0}")]
    InvalidTag(String),
}

impl SmartUnderwriteError {
    /// Stable error code for callers that map failures to e.g. HTTP status
    /// without matching on message text.
    pub fn code(&self) -> &'static ErrorCode {
        match self {
            Self::InvalidExpression { .. } => &codes::INVALID_EXPRESSION,
            Self::InvalidRuleDefinition { .. } => &codes::INVALID_RULE_DEFINITION,
            Self::InvalidJson(_) => &codes::INVALID_JSON,
            Self::NotFound(_) => &codes::RULE_NOT_FOUND,
            Self::Conflict(_) => &codes::VERSION_CONFLICT,
            Self::Cancelled => &codes::CANCELLED,
            Self::Internal(_) => &codes::INTERNAL,
            Self::InvalidTag(_) => &codes::INVALID_TAG,
        }
    }
}

impl From<serde_json::Error> for SmartUnderwriteError {
    fn from(err: serde_json::Error) -> Self {
        SmartUnderwriteError::InvalidJson(err.to_string())
    }
}

/// Create a JSON error response with code, message, and timestamp.
///
/// Intended for a request-handling layer (out of scope here) that wants a
/// stable wire shape for failures without depending on this crate's error
/// enum directly.
pub fn create_error_response(error_code: &ErrorCode, message: &str) -> String {
    serde_json::json!({
        "error": message,
        "error_code": error_code.code,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
    .to_string()
}

pub fn create_custom_error(error_code: &ErrorCode, custom_message: String) -> String {
    create_error_response(error_code, &custom_message)
}

#[allow(dead_code)]
pub fn create_default_error(error_code: &ErrorCode) -> String {
    create_error_response(error_code, error_code.default_message)
}
