//! The Expression Compiler: a restricted boolean grammar over a fixed
//! field catalog, compiled into pure predicates over an
//! [`EvaluationContext`], with no reflection and no external expression
//! evaluator (spec §9 Design Notes).

pub mod ast;
pub mod compiler;
pub mod context;
pub mod lexer;
pub mod parser;

pub use ast::{CompareOp, Expr, Literal};
pub use compiler::{compile, field_catalog, validate, CompiledExpr, FieldInfo, FieldType};
pub use context::{AdditionalValue, EvaluationContext, EvaluationContextBuilder};
