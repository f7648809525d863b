//! Structural and semantic validation of a [`RuleDefinition`] (spec §4.2).

use crate::expr;

use super::definition::RuleDefinition;

/// Errors fail validation; warnings do not (spec §4.2: `isValid` is the
/// conjunction of "no errors").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs structural and semantic validation of a rule definition, compiling
/// every condition via the Expression Compiler along the way.
pub fn validate_rule_definition(def: &RuleDefinition) -> ValidationResult {
    let mut result = ValidationResult::default();

    if def.name.trim().is_empty() {
        result.errors.push("name must not be empty".to_string());
    }

    if def.priority < 0 {
        result.errors.push("priority must not be negative".to_string());
    }

    if def.clauses.is_empty() {
        result
            .errors
            .push("at least one clause is required".to_string());
    }

    for (idx, clause) in def.clauses.iter().enumerate() {
        if clause.condition.trim().is_empty() {
            result
                .errors
                .push(format!("clause {}: 'if' must not be empty", idx));
        } else if !expr::validate(&clause.condition) {
            result.errors.push(format!(
                "clause {}: condition '{}' failed to compile",
                idx, clause.condition
            ));
        }

        if clause.reason.trim().is_empty() {
            result
                .warnings
                .push(format!("clause {}: missing reason", idx));
        }
    }

    if let Some(score) = &def.score {
        if score.base < 0 {
            result.errors.push("score.base must not be negative".to_string());
        }
        validate_modifiers("add", &score.add, &mut result);
        validate_modifiers("subtract", &score.subtract, &mut result);
    }

    result
}

fn validate_modifiers(
    label: &str,
    modifiers: &[super::definition::Modifier],
    result: &mut ValidationResult,
) {
    for (idx, modifier) in modifiers.iter().enumerate() {
        if modifier.when.trim().is_empty() {
            result
                .errors
                .push(format!("score.{}[{}]: 'when' must not be empty", label, idx));
        } else if !expr::validate(&modifier.when) {
            result.errors.push(format!(
                "score.{}[{}]: condition '{}' failed to compile",
                label, idx, modifier.when
            ));
        }

        if modifier.points < 0 {
            result.errors.push(format!(
                "score.{}[{}]: points must not be negative",
                label, idx
            ));
        } else if modifier.points == 0 {
            result
                .warnings
                .push(format!("score.{}[{}]: points is 0, modifier has no effect", label, idx));
        }
    }
}
