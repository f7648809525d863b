//! Rule Service: orchestrates CRUD + versioning (spec §4.4). Every
//! create, update, activation toggle, deletion, and explicit new-version
//! operation writes a version record before the corresponding mutation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::cancellation::Cancellation;
use crate::error::SmartUnderwriteError;
use crate::rules::{parse_rule_definition, validate_rule_definition, ValidationResult};
use crate::store::{NewRuleVersion, Rule, RuleStore, RuleVersion};

/// Principal identifier attached to every mutation for audit purposes.
/// Authentication itself is out of scope (spec §1); callers supply it.
pub type Principal = String;

pub struct RuleService {
    store: Arc<dyn RuleStore>,
}

impl RuleService {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self, cancellation: &Cancellation) -> Result<Vec<Rule>, SmartUnderwriteError> {
        self.store.get_all(cancellation).await
    }

    pub async fn get_active(&self, cancellation: &Cancellation) -> Result<Vec<Rule>, SmartUnderwriteError> {
        self.store.get_active(cancellation).await
    }

    pub async fn get_by_id(&self, id: i64, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError> {
        self.store.get_by_id(id, cancellation).await
    }

    pub fn validate_definition(&self, json: &str) -> ValidationResult {
        crate::rules::validate_rule_json(json)
    }

    pub async fn get_history(
        &self,
        original_rule_id: i64,
        cancellation: &Cancellation,
    ) -> Result<Vec<RuleVersion>, SmartUnderwriteError> {
        self.store.get_history(original_rule_id, cancellation).await
    }

    /// Validates `definition_json`, assigns a new rule id, writes an
    /// "Initial version" record, then inserts the live row.
    #[instrument(skip(self, definition_json, cancellation))]
    pub async fn create(
        &self,
        name: String,
        description: String,
        priority: i64,
        definition_json: String,
        created_by: Principal,
        cancellation: &Cancellation,
    ) -> Result<Rule, SmartUnderwriteError> {
        self.check_definition(&definition_json)?;

        let id = self.store.next_rule_id(cancellation).await?;
        let now = Utc::now();
        let rule = Rule {
            id,
            name,
            description,
            definition: definition_json,
            priority,
            active: true,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_version(snapshot(&rule, "Initial version", created_by), cancellation)
            .await?;
        let created = self.store.create(rule, cancellation).await?;
        info!(rule_id = created.id, "rule created");
        Ok(created)
    }

    /// Writes a pre-mutation version record, then applies the update.
    #[instrument(skip(self, definition_json, cancellation))]
    pub async fn update(
        &self,
        id: i64,
        name: String,
        description: String,
        priority: i64,
        definition_json: String,
        created_by: Principal,
        cancellation: &Cancellation,
    ) -> Result<Rule, SmartUnderwriteError> {
        self.check_definition(&definition_json)?;

        let current = self.store.get_by_id(id, cancellation).await?;
        self.store
            .create_version(snapshot(&current, "Rule updated", created_by), cancellation)
            .await?;

        let updated = Rule {
            name,
            description,
            definition: definition_json,
            priority,
            updated_at: Utc::now(),
            ..current
        };
        self.store.update(updated, cancellation).await
    }

    /// No-op (logged, not erroring) when the rule is already active.
    #[instrument(skip(self, cancellation))]
    pub async fn activate(
        &self,
        id: i64,
        created_by: Principal,
        cancellation: &Cancellation,
    ) -> Result<Rule, SmartUnderwriteError> {
        let current = self.store.get_by_id(id, cancellation).await?;
        if current.active {
            warn!(rule_id = id, "activate called on an already-active rule");
            return Ok(current);
        }
        self.store
            .create_version(snapshot(&current, "Rule activated", created_by), cancellation)
            .await?;
        let updated = Rule {
            active: true,
            updated_at: Utc::now(),
            ..current
        };
        self.store.update(updated, cancellation).await
    }

    /// No-op (logged, not erroring) when the rule is already inactive.
    #[instrument(skip(self, cancellation))]
    pub async fn deactivate(
        &self,
        id: i64,
        created_by: Principal,
        cancellation: &Cancellation,
    ) -> Result<Rule, SmartUnderwriteError> {
        let current = self.store.get_by_id(id, cancellation).await?;
        if !current.active {
            warn!(rule_id = id, "deactivate called on an already-inactive rule");
            return Ok(current);
        }
        self.store
            .create_version(snapshot(&current, "Rule deactivated", created_by), cancellation)
            .await?;
        let updated = Rule {
            active: false,
            updated_at: Utc::now(),
            ..current
        };
        self.store.update(updated, cancellation).await
    }

    /// Writes a version record snapshotting the pre-delete state, then
    /// removes the live row.
    #[instrument(skip(self, cancellation))]
    pub async fn delete(
        &self,
        id: i64,
        created_by: Principal,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError> {
        let current = self.store.get_by_id(id, cancellation).await?;
        self.store
            .create_version(snapshot(&current, "Rule deleted", created_by), cancellation)
            .await?;
        self.store.delete(id, cancellation).await
    }

    /// Deactivates `id` and inserts a *new* active Rule row as its
    /// successor (spec §4.4 step 5). The new row gets a fresh id; lineage
    /// is only recoverable via `rule_versions.original_rule_id`, a
    /// preserved API-ergonomics caveat (spec §9 Open Question).
    #[instrument(skip(self, cancellation))]
    pub async fn create_new_version(
        &self,
        id: i64,
        created_by: Principal,
        cancellation: &Cancellation,
    ) -> Result<Rule, SmartUnderwriteError> {
        let old = self.store.get_by_id(id, cancellation).await?;

        self.store
            .create_version(snapshot(&old, "New version created", created_by.clone()), cancellation)
            .await?;
        let deactivated_old = Rule {
            active: false,
            updated_at: Utc::now(),
            ..old.clone()
        };
        self.store.update(deactivated_old, cancellation).await?;

        let new_id = self.store.next_rule_id(cancellation).await?;
        let now = Utc::now();
        let new_rule = Rule {
            id: new_id,
            name: old.name,
            description: old.description,
            definition: old.definition,
            priority: old.priority,
            active: true,
            tags: old.tags,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_version(snapshot(&new_rule, "Initial version", created_by), cancellation)
            .await?;
        self.store.create(new_rule, cancellation).await
    }

    /// Adds an organizational tag to a rule (spec §3 supplement). Does not
    /// write a version record: tags live alongside the rule row, not in
    /// its versioned definition, mirroring the teacher's separate
    /// `rule_tags` table.
    pub async fn add_tag(
        &self,
        id: i64,
        tag: String,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError> {
        self.store.add_tag(id, tag, cancellation).await
    }

    pub async fn remove_tag(
        &self,
        id: i64,
        tag: &str,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError> {
        self.store.remove_tag(id, tag, cancellation).await
    }

    fn check_definition(&self, definition_json: &str) -> Result<(), SmartUnderwriteError> {
        let def = parse_rule_definition(definition_json)?;
        let result = validate_rule_definition(&def);
        if !result.is_valid() {
            return Err(SmartUnderwriteError::InvalidRuleDefinition {
                errors: result.errors,
            });
        }
        Ok(())
    }
}

fn snapshot(rule: &Rule, change_reason: &str, created_by: Principal) -> NewRuleVersion {
    NewRuleVersion {
        original_rule_id: rule.id,
        name: rule.name.clone(),
        description: rule.description.clone(),
        definition: rule.definition.clone(),
        priority: rule.priority,
        active: rule.active,
        created_by,
        change_reason: change_reason.to_string(),
    }
}
