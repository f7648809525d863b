//! Rule Store: persists rules and their immutable version records; offers
//! priority-ordered retrieval of active rules (spec §4.3).
//!
//! Persistence drivers are out of scope (spec §1). This module defines
//! the contract and a fully-functional in-memory reference
//! implementation; a real backend implements the same [`RuleStore`]
//! trait against the two-table schema of spec §6.

pub mod memory;
pub mod models;
pub mod validation;

use async_trait::async_trait;

use crate::cancellation::Cancellation;
use crate::error::SmartUnderwriteError;

pub use memory::InMemoryRuleStore;
pub use models::{Rule, RuleVersion};
pub use validation::validate_tag;

/// Snapshot fields needed to write a version record. `id` and `version`
/// are assigned by the store; callers provide everything else.
#[derive(Debug, Clone)]
pub struct NewRuleVersion {
    pub original_rule_id: i64,
    pub name: String,
    pub description: String,
    pub definition: String,
    pub priority: i64,
    pub active: bool,
    pub created_by: String,
    pub change_reason: String,
}

/// Persistence contract for `rules` and `rule_versions` (spec §6). All
/// operations are async: the only suspension point in the core is the
/// store boundary (spec §5). Every operation accepts the ambient
/// [`Cancellation`] signal spec §5 requires of "every public operation".
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Rules with `active=true`, sorted by `priority` ascending, stable
    /// by `id` ascending on ties.
    async fn get_active(&self, cancellation: &Cancellation) -> Result<Vec<Rule>, SmartUnderwriteError>;

    async fn get_all(&self, cancellation: &Cancellation) -> Result<Vec<Rule>, SmartUnderwriteError>;

    async fn get_by_id(&self, id: i64, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError>;

    async fn create(&self, rule: Rule, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError>;

    async fn update(&self, rule: Rule, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError>;

    async fn delete(&self, id: i64, cancellation: &Cancellation) -> Result<(), SmartUnderwriteError>;

    /// Full version history for `original_rule_id`, ordered by `version`
    /// ascending.
    async fn get_history(
        &self,
        original_rule_id: i64,
        cancellation: &Cancellation,
    ) -> Result<Vec<RuleVersion>, SmartUnderwriteError>;

    async fn get_latest_version(
        &self,
        original_rule_id: i64,
        cancellation: &Cancellation,
    ) -> Result<Option<RuleVersion>, SmartUnderwriteError>;

    /// Assigns the next version number atomically per `original_rule_id`
    /// and inserts the snapshot.
    async fn create_version(
        &self,
        record: NewRuleVersion,
        cancellation: &Cancellation,
    ) -> Result<RuleVersion, SmartUnderwriteError>;

    /// Allocates the next unused rule id. Used by the Rule Service for
    /// `create` and `createNewVersion`, which both insert new `Rule` rows.
    async fn next_rule_id(&self, cancellation: &Cancellation) -> Result<i64, SmartUnderwriteError>;

    /// Adds `tag` to `rule_id`'s tag set, validated per
    /// [`validation::validate_tag`]. Idempotent: adding a tag already
    /// present is a no-op (spec §3 supplement, grounded in the teacher's
    /// `rule_tag_add`).
    async fn add_tag(
        &self,
        rule_id: i64,
        tag: String,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError>;

    /// Removes `tag` from `rule_id`'s tag set. A no-op if the tag isn't
    /// present.
    async fn remove_tag(
        &self,
        rule_id: i64,
        tag: &str,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError>;
}
