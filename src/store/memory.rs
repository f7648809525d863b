use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cancellation::Cancellation;
use crate::error::SmartUnderwriteError;

use super::{validate_tag, NewRuleVersion, Rule, RuleStore, RuleVersion};

#[derive(Default)]
struct State {
    rules: HashMap<i64, Rule>,
    next_rule_id: i64,
    versions: HashMap<i64, Vec<RuleVersion>>,
    next_version_id: i64,
}

/// Reference [`RuleStore`] implementation backed by an in-process map.
///
/// Guards all mutable state behind a single [`RwLock`]; every mutation
/// takes the write half, which serializes version-number allocation
/// across all rules. This is coarser than the per-`original_rule_id`
/// locking spec §5 allows, but satisfies the same invariant: no two
/// version records for the same rule are ever assigned the same version
/// number.
#[derive(Default)]
pub struct InMemoryRuleStore {
    state: RwLock<State>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: i64) -> SmartUnderwriteError {
    SmartUnderwriteError::NotFound(format!("rule {} not found", id))
}

#[async_trait::async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn get_active(&self, cancellation: &Cancellation) -> Result<Vec<Rule>, SmartUnderwriteError> {
        cancellation.check()?;
        let state = self.state.read();
        let mut rules: Vec<Rule> = state.rules.values().filter(|r| r.active).cloned().collect();
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        Ok(rules)
    }

    async fn get_all(&self, cancellation: &Cancellation) -> Result<Vec<Rule>, SmartUnderwriteError> {
        cancellation.check()?;
        let state = self.state.read();
        let mut rules: Vec<Rule> = state.rules.values().cloned().collect();
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rules)
    }

    async fn get_by_id(&self, id: i64, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError> {
        cancellation.check()?;
        self.state
            .read()
            .rules
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, rule: Rule, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError> {
        cancellation.check()?;
        let mut state = self.state.write();
        if state.rules.contains_key(&rule.id) {
            return Err(SmartUnderwriteError::Conflict(format!(
                "rule {} already exists",
                rule.id
            )));
        }
        state.next_rule_id = state.next_rule_id.max(rule.id + 1);
        state.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn update(&self, rule: Rule, cancellation: &Cancellation) -> Result<Rule, SmartUnderwriteError> {
        cancellation.check()?;
        let mut state = self.state.write();
        if !state.rules.contains_key(&rule.id) {
            return Err(not_found(rule.id));
        }
        state.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn delete(&self, id: i64, cancellation: &Cancellation) -> Result<(), SmartUnderwriteError> {
        cancellation.check()?;
        let mut state = self.state.write();
        if state.rules.remove(&id).is_none() {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn get_history(
        &self,
        original_rule_id: i64,
        cancellation: &Cancellation,
    ) -> Result<Vec<RuleVersion>, SmartUnderwriteError> {
        cancellation.check()?;
        let state = self.state.read();
        let mut versions = state
            .versions
            .get(&original_rule_id)
            .cloned()
            .unwrap_or_default();
        versions.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(versions)
    }

    async fn get_latest_version(
        &self,
        original_rule_id: i64,
        cancellation: &Cancellation,
    ) -> Result<Option<RuleVersion>, SmartUnderwriteError> {
        cancellation.check()?;
        let state = self.state.read();
        Ok(state
            .versions
            .get(&original_rule_id)
            .and_then(|versions| versions.iter().max_by_key(|v| v.version))
            .cloned())
    }

    async fn create_version(
        &self,
        record: NewRuleVersion,
        cancellation: &Cancellation,
    ) -> Result<RuleVersion, SmartUnderwriteError> {
        cancellation.check()?;
        let mut state = self.state.write();
        let next_version = state
            .versions
            .get(&record.original_rule_id)
            .and_then(|versions| versions.iter().map(|v| v.version).max())
            .unwrap_or(0)
            + 1;

        let id = state.next_version_id;
        state.next_version_id += 1;

        let version = RuleVersion {
            id,
            original_rule_id: record.original_rule_id,
            name: record.name,
            description: record.description,
            definition: record.definition,
            priority: record.priority,
            active: record.active,
            version: next_version,
            created_at: chrono::Utc::now(),
            created_by: record.created_by,
            change_reason: record.change_reason,
        };

        state
            .versions
            .entry(record.original_rule_id)
            .or_default()
            .push(version.clone());

        Ok(version)
    }

    async fn next_rule_id(&self, cancellation: &Cancellation) -> Result<i64, SmartUnderwriteError> {
        cancellation.check()?;
        let mut state = self.state.write();
        let id = state.next_rule_id;
        state.next_rule_id += 1;
        Ok(id)
    }

    async fn add_tag(
        &self,
        rule_id: i64,
        tag: String,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError> {
        cancellation.check()?;
        validate_tag(&tag)?;
        let mut state = self.state.write();
        let rule = state.rules.get_mut(&rule_id).ok_or_else(|| not_found(rule_id))?;
        if !rule.tags.contains(&tag) {
            rule.tags.push(tag);
        }
        Ok(())
    }

    async fn remove_tag(
        &self,
        rule_id: i64,
        tag: &str,
        cancellation: &Cancellation,
    ) -> Result<(), SmartUnderwriteError> {
        cancellation.check()?;
        let mut state = self.state.write();
        let rule = state.rules.get_mut(&rule_id).ok_or_else(|| not_found(rule_id))?;
        rule.tags.retain(|t| t != tag);
        Ok(())
    }
}
