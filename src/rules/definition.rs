use serde::{Deserialize, Serialize};

/// Action a fired clause takes, upper-case ASCII on the wire (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Approve,
    Reject,
    Manual,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Manual => "MANUAL",
        }
    }
}

/// One `if/then/reason` triple. First-match-wins within a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clause {
    #[serde(rename = "if")]
    pub condition: String,
    #[serde(rename = "then")]
    pub action: Action,
    #[serde(default)]
    pub reason: String,
}

/// A single additive or subtractive score adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    pub when: String,
    pub points: i64,
}

/// Base score plus conditional adjustments (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBlock {
    #[serde(default)]
    pub base: i64,
    #[serde(default)]
    pub add: Vec<Modifier>,
    #[serde(default)]
    pub subtract: Vec<Modifier>,
}

/// The typed shape of a rule's JSON definition, the source of truth
/// stored alongside the `Rule` row (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub score: Option<ScoreBlock>,
}
