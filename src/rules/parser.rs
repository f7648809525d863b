//! Rule Parser: deserializes the rule JSON wire format (spec §6) into a
//! typed [`RuleDefinition`], leniently (case-insensitive keys, trailing
//! commas allowed), then runs structural and semantic validation.

use serde_json::Value;

use crate::error::SmartUnderwriteError;

use super::definition::RuleDefinition;
use super::validation::{validate_rule_definition, ValidationResult};

/// Deserializes a rule JSON document into a typed [`RuleDefinition`].
///
/// Accepts case-insensitive top-level keys and a trailing comma before a
/// closing `}`/`]`, both common authoring mistakes in hand-edited rule
/// files. Unknown top-level fields are ignored for forward compatibility
/// (spec §6).
pub fn parse_rule_definition(json: &str) -> Result<RuleDefinition, SmartUnderwriteError> {
    let normalized = strip_trailing_commas(json);
    let value: Value = serde_json::from_str(&normalized)
        .map_err(|e| SmartUnderwriteError::InvalidJson(e.to_string()))?;
    let lowered = lowercase_keys(value);
    serde_json::from_value(lowered).map_err(|e| SmartUnderwriteError::InvalidJson(e.to_string()))
}

/// Composes parse + validate: a malformed JSON body surfaces as a single
/// validation error rather than an exception (spec §4.2).
pub fn validate_rule_json(json: &str) -> ValidationResult {
    match parse_rule_definition(json) {
        Ok(def) => validate_rule_definition(&def),
        Err(err) => ValidationResult {
            errors: vec![err.to_string()],
            warnings: Vec::new(),
        },
    }
}

/// Recursively lowercases object keys so `"Name"`, `"NAME"` and `"name"`
/// all bind to the same struct field.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.to_lowercase(), lowercase_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Removes a comma that appears (ignoring whitespace) immediately before
/// a closing `}` or `]`, outside of string literals.
fn strip_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = json.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if c == ',' {
            // Look ahead past whitespace for a closing bracket.
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}
