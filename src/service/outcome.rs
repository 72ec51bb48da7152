//! Outcome of a best-effort CRM step.

use crate::crm::CrmError;

/// Result of a step whose failure must not abort the lead pipeline.
///
/// Required steps return `Result<T, CrmError>` and propagate with `?`.
/// Best-effort steps return `BestEffort<T>`: the error is kept (and
/// logged) but the pipeline continues with a degraded outcome.
#[derive(Debug)]
#[must_use]
pub enum BestEffort<T> {
    /// The step succeeded.
    Completed(T),
    /// The step failed; the pipeline carried on without it.
    Degraded(CrmError),
}

impl<T> BestEffort<T> {
    /// Wraps a step result, logging the failure under `step`.
    pub fn from_result(step: &'static str, result: Result<T, CrmError>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => {
                tracing::warn!(step, error = %err, "best-effort CRM step failed, continuing");
                Self::Degraded(err)
            }
        }
    }

    /// Returns `true` if the step succeeded.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the value of a completed step.
    #[must_use]
    pub fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Degraded(_) => None,
        }
    }

    /// Returns the error of a degraded step.
    #[must_use]
    pub const fn error(&self) -> Option<&CrmError> {
        match self {
            Self::Completed(_) => None,
            Self::Degraded(err) => Some(err),
        }
    }
}
