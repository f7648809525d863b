use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::SmartUnderwriteError;

use super::ast::{CompareOp, Expr, Literal};
use super::context::EvaluationContext;
use super::parser;

/// The declared type of a recognized field, used for compile-time type
/// checking of comparisons (spec §4.1: "type mismatch ... fails").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Decimal,
    NullableInt,
    Text,
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub name: &'static str,
    pub ty: FieldType,
}

const FIELD_CATALOG: &[FieldInfo] = &[
    FieldInfo {
        name: "Amount",
        ty: FieldType::Decimal,
    },
    FieldInfo {
        name: "IncomeMonthly",
        ty: FieldType::Decimal,
    },
    FieldInfo {
        name: "CreditScore",
        ty: FieldType::NullableInt,
    },
    FieldInfo {
        name: "EmploymentType",
        ty: FieldType::Text,
    },
    FieldInfo {
        name: "ProductType",
        ty: FieldType::Text,
    },
    FieldInfo {
        name: "ApplicationDate",
        ty: FieldType::Timestamp,
    },
];

/// Returns the catalog of recognized field names and their types, so a
/// rule-building UI (out of scope here) can offer autocomplete without
/// re-deriving the grammar.
pub fn field_catalog() -> &'static [FieldInfo] {
    FIELD_CATALOG
}

fn lookup_field(name: &str) -> Option<FieldType> {
    FIELD_CATALOG
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.ty)
}

/// A condition compiled into a pure predicate over an [`EvaluationContext`].
pub struct CompiledExpr {
    source: String,
    predicate: Box<dyn Fn(&EvaluationContext) -> bool + Send + Sync>,
}

impl CompiledExpr {
    pub fn evaluate(&self, ctx: &EvaluationContext) -> bool {
        (self.predicate)(ctx)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Compiles a condition string into a predicate over an evaluation context.
///
/// Fails with [`SmartUnderwriteError::InvalidExpression`] on unknown
/// identifiers, type mismatches, malformed tokens, unbalanced
/// parentheses, or an empty expression. Never panics.
pub fn compile(expr: &str) -> Result<CompiledExpr, SmartUnderwriteError> {
    let ast = parser::parse(expr).map_err(|reason| SmartUnderwriteError::InvalidExpression {
        fragment: expr.to_string(),
        reason,
    })?;
    let predicate =
        bind(&ast).map_err(|reason| SmartUnderwriteError::InvalidExpression {
            fragment: expr.to_string(),
            reason,
        })?;
    Ok(CompiledExpr {
        source: expr.to_string(),
        predicate,
    })
}

/// Returns `true` iff `compile` would succeed. Never panics.
pub fn validate(expr: &str) -> bool {
    compile(expr).is_ok()
}

type Predicate = Box<dyn Fn(&EvaluationContext) -> bool + Send + Sync>;

fn bind(expr: &Expr) -> Result<Predicate, String> {
    match expr {
        Expr::And(lhs, rhs) => {
            let lhs = bind(lhs)?;
            let rhs = bind(rhs)?;
            Ok(Box::new(move |ctx| lhs(ctx) && rhs(ctx)))
        }
        Expr::Or(lhs, rhs) => {
            let lhs = bind(lhs)?;
            let rhs = bind(rhs)?;
            Ok(Box::new(move |ctx| lhs(ctx) || rhs(ctx)))
        }
        Expr::Comparison { field, op, literal } => bind_comparison(field, *op, literal),
    }
}

fn bind_comparison(field: &str, op: CompareOp, literal: &Literal) -> Result<Predicate, String> {
    let field_name = field.to_string();
    let ty = lookup_field(field).ok_or_else(|| format!("unknown identifier '{}'", field))?;

    match ty {
        FieldType::Decimal => {
            let rhs = match literal {
                Literal::Number(d) => *d,
                Literal::Null => {
                    return Err(format!("field '{}' is not nullable", field_name));
                }
                Literal::Str(_) => {
                    return Err(format!(
                        "cannot compare numeric field '{}' to a string literal",
                        field_name
                    ));
                }
            };
            let accessor: fn(&EvaluationContext) -> Decimal = match field_name.as_str() {
                "Amount" => |ctx| ctx.amount,
                "IncomeMonthly" => |ctx| ctx.income_monthly,
                _ => unreachable!(),
            };
            Ok(Box::new(move |ctx| {
                compare_decimal(accessor(ctx), op, rhs)
            }))
        }
        FieldType::NullableInt => match literal {
            Literal::Null => {
                // Parser already restricts null comparisons to ==/!=.
                let want_none = matches!(op, CompareOp::Eq);
                Ok(Box::new(move |ctx: &EvaluationContext| {
                    ctx.credit_score.is_none() == want_none
                }))
            }
            Literal::Number(d) => {
                let rhs = *d;
                Ok(Box::new(move |ctx: &EvaluationContext| {
                    // spec §4.1: comparing a null CreditScore with any
                    // numeric op other than ==/!= null evaluates to false.
                    match ctx.credit_score {
                        Some(v) => compare_decimal(Decimal::from(v), op, rhs),
                        None => false,
                    }
                }))
            }
            Literal::Str(_) => Err(format!(
                "cannot compare field '{}' to a string literal",
                field_name
            )),
        },
        FieldType::Text => {
            let rhs = match literal {
                Literal::Str(s) => s.clone(),
                Literal::Null => {
                    return Err(format!("field '{}' is not nullable", field_name));
                }
                Literal::Number(_) => {
                    return Err(format!(
                        "cannot compare text field '{}' to a numeric literal",
                        field_name
                    ));
                }
            };
            if !matches!(op, CompareOp::Eq | CompareOp::Ne) {
                return Err(format!(
                    "operator '{}' is not supported for text field '{}'",
                    op.as_str(),
                    field_name
                ));
            }
            let accessor: fn(&EvaluationContext) -> &str = match field_name.as_str() {
                "EmploymentType" => |ctx| ctx.employment_type.as_str(),
                "ProductType" => |ctx| ctx.product_type.as_str(),
                _ => unreachable!(),
            };
            Ok(Box::new(move |ctx| {
                let matched = accessor(ctx) == rhs;
                if matches!(op, CompareOp::Eq) {
                    matched
                } else {
                    !matched
                }
            }))
        }
        FieldType::Timestamp => {
            let raw = match literal {
                Literal::Str(s) => s.clone(),
                Literal::Null => {
                    return Err(format!("field '{}' is not nullable", field_name));
                }
                Literal::Number(_) => {
                    return Err(format!(
                        "cannot compare timestamp field '{}' to a numeric literal",
                        field_name
                    ));
                }
            };
            let rhs = parse_timestamp(&raw)
                .ok_or_else(|| format!("invalid date literal '{}' for field '{}'", raw, field_name))?;
            Ok(Box::new(move |ctx: &EvaluationContext| {
                compare_ord(ctx.application_date, op, rhs)
            }))
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap().and_utc())
}

fn compare_decimal(lhs: Decimal, op: CompareOp, rhs: Decimal) -> bool {
    compare_ord(lhs, op, rhs)
}

fn compare_ord<T: PartialOrd>(lhs: T, op: CompareOp, rhs: T) -> bool {
    match op {
        CompareOp::Eq => lhs == rhs,
        CompareOp::Ne => lhs != rhs,
        CompareOp::Lt => lhs < rhs,
        CompareOp::Le => lhs <= rhs,
        CompareOp::Gt => lhs > rhs,
        CompareOp::Ge => lhs >= rhs,
    }
}
