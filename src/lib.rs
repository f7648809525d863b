//! SmartUnderwrite: a multi-tenant loan-application decisioning core.
//!
//! The Rules Engine is the reusable heart of the crate: a JSON-defined,
//! priority-ordered rule set whose conditions are compiled from a
//! restricted expression grammar ([`expr`]) into executable predicates,
//! then applied by the [`engine`] to an evaluation context built from an
//! application. Rule authoring flows through [`rules`] (parsing +
//! validation) and [`service`] (CRUD + immutable version history, backed
//! by a [`store::RuleStore`]).
//!
//! Authentication, HTTP routing, document storage, and the UI are
//! external collaborators and out of scope here.

pub mod cancellation;
pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod rules;
pub mod service;
pub mod store;

pub use cancellation::Cancellation;
pub use config::EngineConfig;
pub use engine::{Applicant, Application, EvaluationEngine, EvaluationResult, RuleResult};
pub use error::SmartUnderwriteError;
pub use rules::{Action, RuleDefinition, ValidationResult};
pub use service::RuleService;
pub use store::{InMemoryRuleStore, Rule, RuleStore, RuleVersion};
