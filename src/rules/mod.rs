//! Rule Parser: typed deserialization of the rule JSON wire format plus
//! structural and semantic validation (spec §4.2).

pub mod definition;
pub mod parser;
pub mod validation;

pub use definition::{Action, Clause, Modifier, RuleDefinition, ScoreBlock};
pub use parser::{parse_rule_definition, validate_rule_json};
pub use validation::{validate_rule_definition, ValidationResult};
