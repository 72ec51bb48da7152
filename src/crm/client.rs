//! CRM remote procedure client.
//!
//! [`CrmApi`] is the seam the lead pipeline talks to. [`BitrixClient`]
//! implements it over HTTP: `POST {base}/{method}.json` with
//! form-encoded parameters and a fixed per-call timeout.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::envelope::unwrap_envelope;
use super::{CrmError, CrmParams};

/// Remote procedure interface of the CRM.
#[async_trait]
pub trait CrmApi: Send + Sync + fmt::Debug {
    /// Returns `false` when calls would fail with
    /// [`CrmError::NotConfigured`] without touching the network.
    fn is_configured(&self) -> bool {
        true
    }

    /// Invokes `method` with `params` and returns the envelope's
    /// `result` verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError`] on configuration, transport, timeout, or
    /// vendor errors. Implementations never retry.
    async fn call(&self, method: &str, params: &CrmParams) -> Result<Value, CrmError>;
}

/// Webhook-style CRM client backed by `reqwest`.
///
/// The webhook URL embeds the access secret, so it is never logged.
#[derive(Clone)]
pub struct BitrixClient {
    base_url: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl BitrixClient {
    /// Creates a client for `base_url` (trailing slashes stripped).
    ///
    /// `None` or a blank URL yields an unconfigured client whose calls
    /// fail with [`CrmError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Transport`] if the HTTP client cannot be
    /// initialised (e.g. the TLS backend fails to load).
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self, CrmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrmError::Transport(e.to_string()))?;
        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, method: &str) -> Result<String, CrmError> {
        let base = self.base_url.as_deref().ok_or(CrmError::NotConfigured)?;
        Ok(format!("{base}/{method}.json"))
    }

    fn transport_error(&self, err: reqwest::Error) -> CrmError {
        if err.is_timeout() {
            CrmError::Timeout(self.timeout)
        } else {
            // the URL carries the webhook secret
            CrmError::Transport(err.without_url().to_string())
        }
    }
}

impl fmt::Debug for BitrixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitrixClient")
            .field("configured", &self.base_url.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CrmApi for BitrixClient {
    fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    async fn call(&self, method: &str, params: &CrmParams) -> Result<Value, CrmError> {
        let url = self.endpoint(method)?;
        tracing::debug!(method, params = params.len(), "calling CRM");

        let response = self
            .http
            .post(&url)
            .form(params.pairs())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        // Error envelopes come with 4xx statuses; the body decides.
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let envelope: Value = serde_json::from_slice(&body).map_err(|e| {
            CrmError::InvalidResponse(format!("HTTP {status}, body is not JSON: {e}"))
        })?;

        let result = unwrap_envelope(envelope);
        if let Err(err) = &result {
            tracing::debug!(method, %status, error = %err, "CRM call failed");
        }
        result
    }
}
