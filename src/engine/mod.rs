//! Evaluation Engine: loads active rules, builds an evaluation context,
//! applies clauses and score modifiers in priority order, and returns an
//! [`EvaluationResult`] (spec §4.5). Pure over its inputs once rules are
//! loaded, it owns no persistent state (spec §3, §5).

mod cache;
mod compiled;
mod types;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::cancellation::Cancellation;
use crate::config::EngineConfig;
use crate::error::SmartUnderwriteError;
use crate::expr::{AdditionalValue, EvaluationContext};
use crate::rules::Action;
use crate::store::{Rule, RuleStore};

use cache::CompiledRuleCache;
use compiled::{CompiledModifier, CompiledRule};

pub use types::{Applicant, Application, EvaluationResult, RuleResult};

pub struct EvaluationEngine {
    store: Arc<dyn RuleStore>,
    cache: CompiledRuleCache,
    config: EngineConfig,
}

impl EvaluationEngine {
    pub fn new(store: Arc<dyn RuleStore>, config: EngineConfig) -> Self {
        let cache = CompiledRuleCache::new(config.compiled_cache_capacity);
        Self {
            store,
            cache,
            config,
        }
    }

    /// Evaluates `application` against the currently active rule set.
    #[instrument(skip(self, application, applicant, cancellation))]
    pub async fn evaluate(
        &self,
        application: &Application,
        applicant: &Applicant,
        cancellation: &Cancellation,
    ) -> Result<EvaluationResult, SmartUnderwriteError> {
        let rules = self.store.get_active(cancellation).await?;
        self.evaluate_with_rules(application, applicant, rules, HashMap::new(), cancellation)
    }

    /// Evaluates `application` against a caller-supplied rule set instead
    /// of the store's active rules (spec §4.5: "or a caller-supplied
    /// set").
    #[instrument(
        skip(self, application, applicant, rules, additional, cancellation),
        fields(evaluation_id = %Uuid::new_v4())
    )]
    pub fn evaluate_with_rules(
        &self,
        application: &Application,
        applicant: &Applicant,
        mut rules: Vec<Rule>,
        additional: HashMap<String, AdditionalValue>,
        cancellation: &Cancellation,
    ) -> Result<EvaluationResult, SmartUnderwriteError> {
        let _ = applicant; // reserved, unused by the grammar (spec §4.5)

        if rules.is_empty() {
            return Ok(EvaluationResult {
                outcome: Action::Manual,
                score: 0,
                reasons: vec!["No active rules".to_string()],
                rule_results: Vec::new(),
            });
        }

        // Deterministic iteration order regardless of how `rules` arrived
        // (spec §4.3, §4.5): priority ascending, id ascending on ties.
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));

        let ctx = build_context(application, additional);

        let mut outcome: Option<Action> = None;
        let mut reasons: Vec<String> = Vec::new();
        let mut seen_reasons: HashSet<String> = HashSet::new();
        let mut rule_results: Vec<Option<RuleResult>> = vec![None; rules.len()];
        let mut halted = false;

        for (i, rule) in rules.iter().enumerate() {
            cancellation.check()?;

            if halted {
                break;
            }

            let compiled = self
                .cache
                .get_or_compile(rule.id, rule.updated_at, &rule.definition);

            let compiled_rule: &CompiledRule = match compiled.as_ref() {
                Err(errors) => {
                    rule_results[i] = Some(RuleResult::failed(rule.name.clone(), errors.clone()));
                    continue;
                }
                Ok(compiled_rule) => compiled_rule,
            };

            let mut fired_action = None;
            let mut fired_reason = None;
            for clause in &compiled_rule.clauses {
                if clause.predicate.evaluate(&ctx) {
                    fired_action = Some(clause.action);
                    fired_reason = Some(clause.reason.clone());
                    break;
                }
            }

            if let (Some(action), Some(reason)) = (fired_action, &fired_reason) {
                apply_outcome(&mut outcome, action);
                push_reason(&mut reasons, &mut seen_reasons, reason.clone());
            }

            rule_results[i] = Some(RuleResult {
                rule_name: rule.name.clone(),
                executed: true,
                outcome: fired_action,
                reason: fired_reason,
                score_impact: 0,
                errors: Vec::new(),
            });

            // REJECT is terminal for outcome/reason purposes: stop walking
            // remaining rules' clauses (spec §4.5 step 1c). Scoring still
            // considers every active rule, below.
            if outcome == Some(Action::Reject) {
                halted = true;
            }
        }

        let outcome = outcome.unwrap_or_else(|| {
            push_reason(&mut reasons, &mut seen_reasons, "No rules matched".to_string());
            Action::Manual
        });

        // Score is a separate pass over every active rule, decoupled from
        // the REJECT short-circuit above: a higher-priority rule rejecting
        // does not stop a lower-priority rule's base/modifiers from
        // contributing (spec §4.5 step 2).
        let mut base_score: i64 = 0;
        let mut score_adjustment: i64 = 0;

        for (i, rule) in rules.iter().enumerate() {
            let compiled = self
                .cache
                .get_or_compile(rule.id, rule.updated_at, &rule.definition);

            let compiled_rule: &CompiledRule = match compiled.as_ref() {
                Err(errors) => {
                    rule_results[i]
                        .get_or_insert_with(|| RuleResult::failed(rule.name.clone(), errors.clone()));
                    continue;
                }
                Ok(compiled_rule) => compiled_rule,
            };

            let mut modifier_errors = Vec::new();
            let mut rule_score_impact: i64 = 0;
            if let Some(score) = &compiled_rule.score {
                base_score = base_score.max(score.base);
                for modifier in &score.add {
                    match modifier {
                        CompiledModifier::Ready(predicate, points) if predicate.evaluate(&ctx) => {
                            score_adjustment += points;
                            rule_score_impact += points;
                        }
                        CompiledModifier::Ready(_, _) => {}
                        CompiledModifier::Broken(err) => modifier_errors.push(err.clone()),
                    }
                }
                for modifier in &score.subtract {
                    match modifier {
                        CompiledModifier::Ready(predicate, points) if predicate.evaluate(&ctx) => {
                            score_adjustment -= points;
                            rule_score_impact -= points;
                        }
                        CompiledModifier::Ready(_, _) => {}
                        CompiledModifier::Broken(err) => modifier_errors.push(err.clone()),
                    }
                }
            }

            match rule_results[i].as_mut() {
                Some(existing) => {
                    existing.score_impact = rule_score_impact;
                    existing.errors.extend(modifier_errors);
                }
                None => {
                    rule_results[i] = Some(RuleResult {
                        rule_name: rule.name.clone(),
                        executed: true,
                        outcome: None,
                        reason: None,
                        score_impact: rule_score_impact,
                        errors: modifier_errors,
                    });
                }
            }
        }

        let score = (base_score + score_adjustment).max(self.config.score_floor);

        Ok(EvaluationResult {
            outcome,
            score,
            reasons,
            rule_results: rule_results.into_iter().flatten().collect(),
        })
    }
}

fn apply_outcome(current: &mut Option<Action>, fired: Action) {
    match fired {
        Action::Reject => *current = Some(Action::Reject),
        Action::Manual | Action::Approve => {
            if *current != Some(Action::Reject) {
                *current = Some(fired);
            }
        }
    }
}

fn push_reason(reasons: &mut Vec<String>, seen: &mut HashSet<String>, reason: String) {
    if seen.insert(reason.clone()) {
        reasons.push(reason);
    }
}

fn build_context(
    application: &Application,
    additional: HashMap<String, AdditionalValue>,
) -> EvaluationContext {
    let mut builder = EvaluationContext::builder()
        .amount(application.amount)
        .income_monthly(application.income_monthly)
        .credit_score(application.credit_score)
        .employment_type(application.employment_type.clone())
        .product_type(application.product_type.clone())
        .application_date(application.created_at);
    for (key, value) in additional {
        builder = builder.additional(key, value);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRuleStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    const EXAMPLE_RULE: &str = r#"{
        "name": "Credit Score Check",
        "priority": 10,
        "clauses": [
            { "if": "CreditScore < 500",  "then": "REJECT",  "reason": "Low credit score" },
            { "if": "CreditScore >= 700", "then": "APPROVE", "reason": "Good credit" },
            { "if": "CreditScore < 650",  "then": "MANUAL",  "reason": "Borderline credit" }
        ],
        "score": {
            "base": 600,
            "add":      [ { "when": "CreditScore >= 750", "points": 50 } ],
            "subtract": [ { "when": "IncomeMonthly < 3000", "points": 25 } ]
        }
    }"#;

    fn rule(id: i64, priority: i64, definition: &str) -> Rule {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Rule {
            id,
            name: format!("rule-{}", id),
            description: String::new(),
            definition: definition.to_string(),
            priority,
            active: true,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn application(credit_score: Option<i64>, amount: i64) -> Application {
        Application {
            amount: Decimal::from(amount),
            income_monthly: Decimal::from(5000),
            credit_score,
            employment_type: "Full-Time".to_string(),
            product_type: "Personal".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn engine() -> EvaluationEngine {
        EvaluationEngine::new(Arc::new(InMemoryRuleStore::new()), EngineConfig::default())
    }

    fn evaluate(
        engine: &EvaluationEngine,
        rules: Vec<Rule>,
        application: &Application,
    ) -> EvaluationResult {
        engine
            .evaluate_with_rules(
                application,
                &Applicant::default(),
                rules,
                HashMap::new(),
                &Cancellation::new(),
            )
            .unwrap()
    }

    #[test]
    fn empty_active_rule_set_yields_default_manual() {
        let result = evaluate(&engine(), vec![], &application(Some(780), 25000));
        assert_eq!(result.outcome, Action::Manual);
        assert_eq!(result.score, 0);
        assert_eq!(result.reasons, vec!["No active rules".to_string()]);
    }

    #[test]
    fn scenario_1_good_credit_approves_with_base_plus_bonus() {
        let result = evaluate(&engine(), vec![rule(1, 10, EXAMPLE_RULE)], &application(Some(780), 25000));
        assert_eq!(result.outcome, Action::Approve);
        assert_eq!(result.reasons, vec!["Good credit".to_string()]);
        assert_eq!(result.score, 650);
    }

    #[test]
    fn scenario_2_low_credit_rejects() {
        let result = evaluate(&engine(), vec![rule(1, 10, EXAMPLE_RULE)], &application(Some(450), 25000));
        assert_eq!(result.outcome, Action::Reject);
        assert_eq!(result.reasons, vec!["Low credit score".to_string()]);
        assert_eq!(result.score, 600);
    }

    #[test]
    fn scenario_3_borderline_credit_matches_no_clause_defaults_manual() {
        let result = evaluate(&engine(), vec![rule(1, 10, EXAMPLE_RULE)], &application(Some(660), 25000));
        assert_eq!(result.outcome, Action::Manual);
        assert_eq!(result.reasons, vec!["No rules matched".to_string()]);
        assert_eq!(result.score, 600);
    }

    #[test]
    fn scenario_4_null_credit_score_never_matches_numeric_clauses() {
        let result = evaluate(&engine(), vec![rule(1, 10, EXAMPLE_RULE)], &application(None, 25000));
        assert_eq!(result.outcome, Action::Manual);
        assert_eq!(result.reasons, vec!["No rules matched".to_string()]);
        assert_eq!(result.score, 600);
    }

    #[test]
    fn scenario_5_higher_priority_rule_fires_first_and_approve_wins() {
        let second = r#"{
            "name": "Amount Guard",
            "priority": 5,
            "clauses": [ { "if": "Amount > 100000", "then": "REJECT", "reason": "Too large" } ]
        }"#;
        let result = evaluate(
            &engine(),
            vec![rule(1, 10, EXAMPLE_RULE), rule(2, 5, second)],
            &application(Some(720), 25000),
        );
        assert_eq!(result.outcome, Action::Approve);
        assert_eq!(result.score, 600);
    }

    #[test]
    fn scenario_6_higher_priority_reject_stops_iteration() {
        let second = r#"{
            "name": "Amount Guard",
            "priority": 5,
            "clauses": [ { "if": "Amount > 100000", "then": "REJECT", "reason": "Too large" } ]
        }"#;
        let result = evaluate(
            &engine(),
            vec![rule(1, 10, EXAMPLE_RULE), rule(2, 5, second)],
            &application(Some(720), 150000),
        );
        assert_eq!(result.outcome, Action::Reject);
        assert_eq!(result.reasons, vec!["Too large".to_string()]);
        assert_eq!(result.score, 600);
    }

    #[test]
    fn malformed_rule_is_isolated_and_evaluation_still_completes() {
        let broken = rule(1, 1, "not json");
        let good = rule(2, 2, EXAMPLE_RULE);
        let result = evaluate(&engine(), vec![broken, good], &application(Some(780), 25000));
        assert_eq!(result.outcome, Action::Approve);
        assert_eq!(result.rule_results.len(), 2);
        assert!(!result.rule_results[0].executed);
        assert!(!result.rule_results[0].errors.is_empty());
        assert!(result.rule_results[1].executed);
    }

    #[test]
    fn reasons_are_deduplicated_preserving_first_occurrence() {
        let duplicate_reason_rule = r#"{
            "name": "Duplicate",
            "priority": 1,
            "clauses": [ { "if": "CreditScore >= 700", "then": "APPROVE", "reason": "Good credit" } ]
        }"#;
        let result = evaluate(
            &engine(),
            vec![rule(1, 1, duplicate_reason_rule), rule(2, 10, EXAMPLE_RULE)],
            &application(Some(780), 25000),
        );
        assert_eq!(result.reasons, vec!["Good credit".to_string()]);
    }

    #[test]
    fn score_never_goes_negative() {
        let harsh = r#"{
            "name": "Harsh",
            "priority": 1,
            "clauses": [ { "if": "Amount > 1", "then": "MANUAL", "reason": "Review" } ],
            "score": { "base": 10, "subtract": [ { "when": "Amount > 1", "points": 1000 } ] }
        }"#;
        let result = evaluate(&engine(), vec![rule(1, 1, harsh)], &application(Some(780), 25000));
        assert!(result.score >= 0);
    }

    #[tokio::test]
    async fn evaluate_fetches_active_rules_from_store() {
        let store = Arc::new(InMemoryRuleStore::new());
        store.create(rule(1, 10, EXAMPLE_RULE), &Cancellation::new()).await.unwrap();
        let engine = EvaluationEngine::new(store, EngineConfig::default());
        let result = engine
            .evaluate(&application(Some(780), 25000), &Applicant::default(), &Cancellation::new())
            .await
            .unwrap();
        assert_eq!(result.outcome, Action::Approve);
    }

    #[test]
    fn cancellation_is_observed_between_rules() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let result = engine().evaluate_with_rules(
            &application(Some(780), 25000),
            &Applicant::default(),
            vec![rule(1, 10, EXAMPLE_RULE)],
            HashMap::new(),
            &cancellation,
        );
        assert!(matches!(result, Err(SmartUnderwriteError::Cancelled)));
    }
}
