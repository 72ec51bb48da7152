//! Lead intake DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ContactId, DealId, DedupeKey};
use crate::service::LeadOutcome;

/// Response body for `POST /lead`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Deal created for the lead.
    pub deal_id: DealId,
    /// Contact the deal is linked to.
    pub contact_id: ContactId,
    /// Informational dedupe key (hex SHA-1 of phone and minute).
    pub key: DedupeKey,
}

impl From<LeadOutcome> for LeadResponse {
    fn from(outcome: LeadOutcome) -> Self {
        Self {
            status: "ok",
            deal_id: outcome.deal_id,
            contact_id: outcome.contact_id(),
            key: outcome.key,
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
}
