//! Cooperative cancellation (spec §5): every public operation accepts an
//! ambient cancellation signal; the Evaluation Engine checks it between
//! rules and never yields a partial `EvaluationResult`.

use tokio_util::sync::CancellationToken;

use crate::error::SmartUnderwriteError;

/// Thin newtype over [`tokio_util::sync::CancellationToken`] so call
/// sites depend on this crate's vocabulary rather than `tokio_util`
/// directly.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(CancellationToken);

impl Cancellation {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Returns `Err(Cancelled)` if the token has fired, else `Ok(())`.
    /// Called between rule iterations so a cancellation never surfaces
    /// as a partial `EvaluationResult`.
    pub fn check(&self) -> Result<(), SmartUnderwriteError> {
        if self.is_cancelled() {
            Err(SmartUnderwriteError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn child_token(&self) -> Cancellation {
        Cancellation(self.0.child_token())
    }
}
