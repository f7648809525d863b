/// Stable, API-facing error code paired with a default human-readable message.
///
/// Kept separate from [`crate::error::SmartUnderwriteError`] so a caller-facing
/// layer (HTTP routing is out of scope for this crate) can map failures to a
/// status code without matching on error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode {
    pub code: &'static str,
    pub default_message: &'static str,
}

pub const EMPTY_RULE_SET: ErrorCode = ErrorCode {
    code: "SU001",
    default_message: "No active rules",
};

pub const INVALID_JSON: ErrorCode = ErrorCode {
    code: "SU002",
    default_message: "Malformed JSON input",
};

pub const INVALID_EXPRESSION: ErrorCode = ErrorCode {
    code: "SU003",
    default_message: "Condition expression failed to compile",
};

pub const INVALID_RULE_DEFINITION: ErrorCode = ErrorCode {
    code: "SU004",
    default_message: "Rule definition failed validation",
};

pub const RULE_NOT_FOUND: ErrorCode = ErrorCode {
    code: "SU005",
    default_message: "Rule not found",
};

pub const VERSION_CONFLICT: ErrorCode = ErrorCode {
    code: "SU006",
    default_message: "Concurrent version allocation collision",
};

pub const CANCELLED: ErrorCode = ErrorCode {
    code: "SU007",
    default_message: "Operation cancelled",
};

pub const INTERNAL: ErrorCode = ErrorCode {
    code: "SU008",
    default_message: "Internal storage failure",
};

pub const INVALID_TAG: ErrorCode = ErrorCode {
    code: "SU009",
    default_message: "Tag failed validation",
};
