//! Property-based tests for the eight universal properties of spec §8.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use smart_underwrite::{
    Action, Applicant, Application, Cancellation, EngineConfig, EvaluationEngine,
    InMemoryRuleStore, Rule, RuleStore,
};

fn base_application() -> Application {
    Application {
        amount: Decimal::from(25_000),
        income_monthly: Decimal::from(5_000),
        credit_score: Some(700),
        employment_type: "Full-Time".to_string(),
        product_type: "Personal".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn engine() -> EvaluationEngine {
    EvaluationEngine::new(Arc::new(InMemoryRuleStore::new()), EngineConfig::default())
}

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

// Property 1: a rule definition round-trips parse -> serialize with
// clause order and fields preserved.
proptest! {
    #[test]
    fn property_1_round_trip_preserves_clause_order(
        clause_count in 1usize..6,
        base in 0i64..10_000,
    ) {
        let clauses: Vec<String> = (0..clause_count)
            .map(|i| format!(
                r#"{{ "if": "Amount > {}", "then": "APPROVE", "reason": "r{}" }}"#,
                i, i
            ))
            .collect();
        let json = format!(
            r#"{{ "name": "x", "priority": 1, "clauses": [{}], "score": {{ "base": {} }} }}"#,
            clauses.join(","),
            base
        );

        let def = smart_underwrite::rules::parse_rule_definition(&json).unwrap();
        let serialized = serde_json::to_string(&def).unwrap();
        let reparsed = smart_underwrite::rules::parse_rule_definition(&serialized).unwrap();

        prop_assert_eq!(def.clauses.len(), reparsed.clauses.len());
        for (a, b) in def.clauses.iter().zip(reparsed.clauses.iter()) {
            prop_assert_eq!(&a.condition, &b.condition);
            prop_assert_eq!(a.action, b.action);
        }
        prop_assert_eq!(def.score.unwrap().base, reparsed.score.unwrap().base);
    }
}

// Property 2: an empty active rule-set always yields the documented default.
#[test]
fn property_2_empty_rule_set_yields_default_manual() {
    let result = engine()
        .evaluate_with_rules(
            &base_application(),
            &Applicant::default(),
            vec![],
            HashMap::new(),
            &Cancellation::new(),
        )
        .unwrap();
    assert_eq!(result.outcome, Action::Manual);
    assert_eq!(result.score, 0);
    assert_eq!(result.reasons, vec!["No active rules".to_string()]);
}

// Property 3: score is never negative, across a wide range of subtract
// modifiers and a fuzzed credit score / amount.
proptest! {
    #[test]
    fn property_3_score_is_never_negative(
        credit_score in prop::option::of(300i64..850),
        amount in 0i64..500_000,
        subtract_points in 0i64..5_000,
    ) {
        let definition = format!(
            r#"{{
                "name": "x", "priority": 1,
                "clauses": [ {{ "if": "Amount >= 0", "then": "MANUAL", "reason": "review" }} ],
                "score": {{ "base": 10, "subtract": [ {{ "when": "Amount >= 0", "points": {} }} ] }}
            }}"#,
            subtract_points
        );
        let application = Application {
            amount: Decimal::from(amount),
            income_monthly: Decimal::from(5_000),
            credit_score,
            employment_type: "Full-Time".to_string(),
            product_type: "Personal".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let result = engine()
            .evaluate_with_rules(
                &application,
                &Applicant::default(),
                vec![rule(1, 1, &definition)],
                HashMap::new(),
                &Cancellation::new(),
            )
            .unwrap();
        prop_assert!(result.score >= 0);
    }
}

// Property 4: if any fired clause rejects, the overall outcome is REJECT.
proptest! {
    #[test]
    fn property_4_reject_always_wins(amount in 0i64..1_000_000) {
        let reject_first = format!(
            r#"{{ "name": "r", "priority": 1, "clauses": [ {{ "if": "Amount >= {}", "then": "REJECT", "reason": "no" }} ] }}"#,
            amount
        );
        let approve_second = r#"{ "name": "a", "priority": 2, "clauses": [ { "if": "Amount >= 0", "then": "APPROVE", "reason": "yes" } ] }"#;

        let application = Application {
            amount: Decimal::from(amount),
            income_monthly: Decimal::from(5_000),
            credit_score: Some(700),
            employment_type: "Full-Time".to_string(),
            product_type: "Personal".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let result = engine()
            .evaluate_with_rules(
                &application,
                &Applicant::default(),
                vec![rule(1, 1, &reject_first), rule(2, 2, approve_second)],
                HashMap::new(),
                &Cancellation::new(),
            )
            .unwrap();
        prop_assert_eq!(result.outcome, Action::Reject);
    }
}

// Property 5: a malformed rule still yields a completed evaluation with
// an `executed=false` trace entry for that rule.
#[test]
fn property_5_malformed_rule_is_isolated() {
    let broken = rule(1, 1, "not json at all");
    let good = rule(2, 2, r#"{ "name": "g", "priority": 2, "clauses": [ { "if": "Amount >= 0", "then": "APPROVE", "reason": "ok" } ] }"#);

    let result = engine()
        .evaluate_with_rules(
            &base_application(),
            &Applicant::default(),
            vec![broken, good],
            HashMap::new(),
            &Cancellation::new(),
        )
        .unwrap();

    assert!(result.rule_results.iter().any(|r| !r.executed && !r.errors.is_empty()));
    assert_eq!(result.outcome, Action::Approve);
}

// Property 6: any rule mutation writes a new `rule_versions` row with
// `version = previous_max + 1`.
#[tokio::test]
async fn property_6_mutation_allocates_next_version() {
    let store = InMemoryRuleStore::new();
    let service = smart_underwrite::RuleService::new(Arc::new(store));
    let cancellation = Cancellation::new();
    let rule = service
        .create(
            "x".to_string(),
            String::new(),
            1,
            r#"{ "name": "x", "priority": 1, "clauses": [ { "if": "Amount > 0", "then": "APPROVE", "reason": "ok" } ] }"#.to_string(),
            "tester".to_string(),
            &cancellation,
        )
        .await
        .unwrap();

    for _ in 0..5 {
        let before = service
            .get_history(rule.id, &cancellation)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap();
        service
            .update(
                rule.id,
                "x".to_string(),
                String::new(),
                1,
                r#"{ "name": "x", "priority": 1, "clauses": [ { "if": "Amount > 0", "then": "APPROVE", "reason": "ok" } ] }"#.to_string(),
                "tester".to_string(),
                &cancellation,
            )
            .await
            .unwrap();
        let after = service
            .get_history(rule.id, &cancellation)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap();
        assert_eq!(after, before + 1);
    }
}

// Property 7: rule iteration is deterministic; identical inputs produce
// an identical `ruleResults` order across repeated evaluations.
#[test]
fn property_7_evaluation_is_deterministic() {
    let rules = vec![
        rule(3, 10, r#"{ "name": "c", "priority": 10, "clauses": [ { "if": "Amount > 0", "then": "MANUAL", "reason": "c" } ] }"#),
        rule(1, 1, r#"{ "name": "a", "priority": 1, "clauses": [ { "if": "Amount > 0", "then": "MANUAL", "reason": "a" } ] }"#),
        rule(2, 1, r#"{ "name": "b", "priority": 1, "clauses": [ { "if": "Amount > 0", "then": "MANUAL", "reason": "b" } ] }"#),
    ];

    let e = engine();
    let first = e
        .evaluate_with_rules(&base_application(), &Applicant::default(), rules.clone(), HashMap::new(), &Cancellation::new())
        .unwrap();
    let second = e
        .evaluate_with_rules(&base_application(), &Applicant::default(), rules, HashMap::new(), &Cancellation::new())
        .unwrap();

    let first_names: Vec<&str> = first.rule_results.iter().map(|r| r.rule_name.as_str()).collect();
    let second_names: Vec<&str> = second.rule_results.iter().map(|r| r.rule_name.as_str()).collect();
    assert_eq!(first_names, second_names);
    assert_eq!(first_names, vec!["rule-1", "rule-2", "rule-3"]);
}

// Property 8: reasons contain no duplicates.
proptest! {
    #[test]
    fn property_8_reasons_have_no_duplicates(rule_count in 1usize..8) {
        let definitions: Vec<String> = (0..rule_count)
            .map(|i| format!(
                r#"{{ "name": "r{}", "priority": {}, "clauses": [ {{ "if": "Amount > 0", "then": "APPROVE", "reason": "Shared reason" }} ] }}"#,
                i, i
            ))
            .collect();
        let rules: Vec<Rule> = definitions.iter().enumerate().map(|(i, d)| rule(i as i64, i as i64, d)).collect();

        let result = engine()
            .evaluate_with_rules(&base_application(), &Applicant::default(), rules, HashMap::new(), &Cancellation::new())
            .unwrap();

        let mut seen = std::collections::HashSet::new();
        for reason in &result.reasons {
            prop_assert!(seen.insert(reason.clone()), "duplicate reason: {}", reason);
        }
    }
}
