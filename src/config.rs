//! Engine-wide configuration: cache sizing and evaluation policy knobs
//! not named by the core spec but required by any real deployment.

use serde::{Deserialize, Serialize};

use crate::error::SmartUnderwriteError;

fn default_compiled_cache_capacity() -> usize {
    512
}

fn default_score_floor() -> i64 {
    0
}

/// Configuration for an [`crate::engine::EvaluationEngine`] instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Entries in the compiled-rule cache (spec §5: keyed by
    /// `(rule_id, updated_at)`). One entry per distinct rule version
    /// seen recently.
    #[serde(default = "default_compiled_cache_capacity")]
    pub compiled_cache_capacity: usize,

    /// When `true`, a `ValidationResult` with warnings (but no errors)
    /// is still treated as invalid by the Rule Service. Spec §4.2 default
    /// is `false`; warnings never fail validation.
    #[serde(default)]
    pub warnings_are_fatal: bool,

    /// Floor the final score is clamped to (spec §4.5 mandates ≥ 0; this
    /// allows a deployment to raise the floor, never lower it below 0).
    #[serde(default = "default_score_floor")]
    pub score_floor: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compiled_cache_capacity: default_compiled_cache_capacity(),
            warnings_are_fatal: false,
            score_floor: default_score_floor(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiled_cache_capacity(mut self, capacity: usize) -> Self {
        self.compiled_cache_capacity = capacity;
        self
    }

    pub fn with_warnings_are_fatal(mut self, fatal: bool) -> Self {
        self.warnings_are_fatal = fatal;
        self
    }

    pub fn with_score_floor(mut self, floor: i64) -> Self {
        self.score_floor = floor;
        self
    }

    /// Validates the configuration, rejecting values that would make the
    /// engine unusable rather than merely unconventional.
    pub fn validate(&self) -> Result<(), SmartUnderwriteError> {
        if self.compiled_cache_capacity == 0 {
            return Err(SmartUnderwriteError::Internal(
                "compiled_cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.score_floor < 0 {
            return Err(SmartUnderwriteError::Internal(
                "score_floor must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
