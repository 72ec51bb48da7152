//! Errors raised by the CRM client.

use std::time::Duration;

/// Failure of a single CRM remote call.
///
/// [`CrmError::NotConfigured`] is a configuration problem detected before
/// any network traffic. Every other variant means the CRM could not be
/// reached or answered with something other than a `result`.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// No webhook base URL is configured.
    #[error("CRM webhook is not configured")]
    NotConfigured,

    /// The CRM answered with an `error` envelope.
    #[error("CRM error: {description}")]
    Remote {
        /// Vendor error code (e.g. `ERROR_CORE`).
        code: String,
        /// Vendor description, or the code when no description was sent.
        description: String,
    },

    /// The call did not complete within the configured timeout.
    #[error("CRM request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection or protocol failure below the envelope level.
    #[error("CRM transport error: {0}")]
    Transport(String),

    /// The response body was not a usable envelope.
    #[error("invalid CRM response: {0}")]
    InvalidResponse(String),
}

impl CrmError {
    /// Returns `true` for configuration errors, which surface as a server
    /// error rather than a gateway error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::NotConfigured)
    }
}
