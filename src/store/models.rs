use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live, editable decisioning unit identified by `id` (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// The JSON source of truth; always parses and validates (spec §3
    /// invariant) by the time it reaches the store.
    pub definition: String,
    pub priority: i64,
    pub active: bool,
    /// Organizational labels (spec §3 supplement), managed through
    /// [`crate::store::RuleStore::add_tag`]/`remove_tag` rather than the
    /// general `update` path.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of a [`Rule`] at a moment in its history (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleVersion {
    pub id: i64,
    pub original_rule_id: i64,
    pub name: String,
    pub description: String,
    pub definition: String,
    pub priority: i64,
    pub active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub change_reason: String,
}
