use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::rules::Action;

/// Inputs carried by a loan application (spec §4.5). Only the fields the
/// restricted grammar can reference are modeled here; the surrounding
/// application-service schema (affiliate id, applicant documents, review
/// state) is out of scope (spec §1).
#[derive(Debug, Clone)]
pub struct Application {
    pub amount: Decimal,
    pub income_monthly: Decimal,
    pub credit_score: Option<i64>,
    pub employment_type: String,
    pub product_type: String,
    pub created_at: DateTime<Utc>,
}

/// Reserved for future grammar fields; currently contributes nothing to
/// the evaluation context (spec §4.5: "currently unused by the grammar
/// but reserved").
#[derive(Debug, Clone, Default)]
pub struct Applicant;

/// Per-rule trace entry (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub rule_name: String,
    pub executed: bool,
    pub outcome: Option<Action>,
    pub reason: Option<String>,
    pub score_impact: i64,
    pub errors: Vec<String>,
}

impl RuleResult {
    pub fn failed(rule_name: String, errors: Vec<String>) -> Self {
        Self {
            rule_name,
            executed: false,
            outcome: None,
            reason: None,
            score_impact: 0,
            errors,
        }
    }
}

/// The outcome of a single evaluation call (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    pub outcome: Action,
    pub score: i64,
    pub reasons: Vec<String>,
    pub rule_results: Vec<RuleResult>,
}
