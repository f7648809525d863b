use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scalar value in the open `additional` extension map. Not reachable
/// from the restricted grammar (spec §4.1 only names the six fixed
/// fields), existing so callers can stash extra context for their own
/// bookkeeping (e.g. a trace id) without the engine caring about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalValue {
    Number(Decimal),
    Str(String),
    Bool(bool),
    Null,
}

/// Transient, read-only projection of an application + applicant used for
/// expression evaluation (spec §3). Never persisted.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub amount: Decimal,
    pub income_monthly: Decimal,
    pub credit_score: Option<i64>,
    pub employment_type: String,
    pub product_type: String,
    pub application_date: DateTime<Utc>,
    pub additional: HashMap<String, AdditionalValue>,
}

impl EvaluationContext {
    pub fn builder() -> EvaluationContextBuilder {
        EvaluationContextBuilder::default()
    }
}

#[derive(Default)]
pub struct EvaluationContextBuilder {
    amount: Option<Decimal>,
    income_monthly: Option<Decimal>,
    credit_score: Option<i64>,
    employment_type: Option<String>,
    product_type: Option<String>,
    application_date: Option<DateTime<Utc>>,
    additional: HashMap<String, AdditionalValue>,
}

impl EvaluationContextBuilder {
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn income_monthly(mut self, income_monthly: Decimal) -> Self {
        self.income_monthly = Some(income_monthly);
        self
    }

    pub fn credit_score(mut self, credit_score: Option<i64>) -> Self {
        self.credit_score = credit_score;
        self
    }

    pub fn employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = Some(employment_type.into());
        self
    }

    pub fn product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    pub fn application_date(mut self, application_date: DateTime<Utc>) -> Self {
        self.application_date = Some(application_date);
        self
    }

    pub fn additional(mut self, key: impl Into<String>, value: AdditionalValue) -> Self {
        self.additional.insert(key.into(), value);
        self
    }

    pub fn build(self) -> EvaluationContext {
        EvaluationContext {
            amount: self.amount.unwrap_or(Decimal::ZERO),
            income_monthly: self.income_monthly.unwrap_or(Decimal::ZERO),
            credit_score: self.credit_score,
            employment_type: self.employment_type.unwrap_or_default(),
            product_type: self.product_type.unwrap_or_default(),
            application_date: self.application_date.unwrap_or_else(Utc::now),
            additional: self.additional,
        }
    }
}
