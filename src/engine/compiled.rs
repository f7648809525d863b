use crate::expr::{self, CompiledExpr};
use crate::rules::{self, Action, RuleDefinition};

/// A single compiled score modifier, or the reason it could not be
/// compiled. A bad modifier is skipped at evaluation time, not fatal to
/// the rule (spec §4.5 step 2).
pub enum CompiledModifier {
    Ready(CompiledExpr, i64),
    Broken(String),
}

pub struct CompiledScoreBlock {
    pub base: i64,
    pub add: Vec<CompiledModifier>,
    pub subtract: Vec<CompiledModifier>,
}

pub struct CompiledClause {
    pub predicate: CompiledExpr,
    pub action: Action,
    pub reason: String,
}

/// A rule definition after JSON parsing and expression compilation. Kept
/// behind the engine's cache, keyed by `(rule_id, updated_at)` (spec §5).
pub struct CompiledRule {
    pub name: String,
    pub clauses: Vec<CompiledClause>,
    pub score: Option<CompiledScoreBlock>,
}

/// Parses and compiles a rule's JSON definition.
///
/// A clause whose condition fails to compile takes down the whole rule
/// (spec §8 property 5: a malformed clause still produces a
/// `ruleResults` entry with `executed=false`). A score modifier that
/// fails to compile is recorded individually and skipped instead
/// (spec §4.5 step 2), without preventing the rest of the rule from
/// running.
pub fn compile_rule(raw_definition: &str) -> Result<CompiledRule, Vec<String>> {
    let def: RuleDefinition = rules::parse_rule_definition(raw_definition)
        .map_err(|e| vec![e.to_string()])?;

    let mut clause_errors = Vec::new();
    let mut clauses = Vec::with_capacity(def.clauses.len());
    for clause in &def.clauses {
        match expr::compile(&clause.condition) {
            Ok(predicate) => clauses.push(CompiledClause {
                predicate,
                action: clause.action,
                reason: clause.reason.clone(),
            }),
            Err(e) => clause_errors.push(e.to_string()),
        }
    }
    if !clause_errors.is_empty() {
        return Err(clause_errors);
    }

    let score = def.score.as_ref().map(|block| CompiledScoreBlock {
        base: block.base,
        add: compile_modifiers(&block.add),
        subtract: compile_modifiers(&block.subtract),
    });

    Ok(CompiledRule {
        name: def.name,
        clauses,
        score,
    })
}

fn compile_modifiers(modifiers: &[rules::Modifier]) -> Vec<CompiledModifier> {
    modifiers
        .iter()
        .map(|m| match expr::compile(&m.when) {
            Ok(predicate) => CompiledModifier::Ready(predicate, m.points),
            Err(e) => CompiledModifier::Broken(e.to_string()),
        })
        .collect()
}
