//! Lead intake handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use tracing::Instrument;

use crate::api::dto::LeadResponse;
use crate::app_state::AppState;
use crate::domain::LeadSubmission;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /lead`: relay a form submission into the CRM.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] for malformed bodies,
/// [`GatewayError::Configuration`] when the CRM is not configured, and
/// [`GatewayError::RemoteService`] when contact or deal creation fails.
///
/// The pipeline runs on its own task: once started it completes even if
/// the caller disconnects or the response deadline passes.
#[utoipa::path(
    post,
    path = "/lead",
    tag = "Leads",
    summary = "Submit a lead",
    description = "Finds or creates the contact by phone, creates a deal, and schedules follow-up reminders. Reminder failures never fail the request.",
    request_body = LeadSubmission,
    responses(
        (status = 200, description = "Lead captured", body = LeadResponse),
        (status = 422, description = "Malformed submission", body = ErrorResponse),
        (status = 500, description = "CRM not configured", body = ErrorResponse),
        (status = 502, description = "CRM rejected contact or deal creation", body = ErrorResponse),
        (status = 504, description = "Response deadline passed; the lead is still being relayed"),
    )
)]
pub async fn submit_lead(
    State(state): State<AppState>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(lead) = payload.map_err(|rejection| GatewayError::Validation(rejection.body_text()))?;
    lead.validate().map_err(GatewayError::Validation)?;

    let service = Arc::clone(&state.lead_service);
    let received_at = Utc::now();
    let pipeline = tokio::spawn(
        async move { service.submit(&lead, received_at).await }.in_current_span(),
    );
    let outcome = pipeline.await??;
    Ok(Json(LeadResponse::from(outcome)))
}

/// Lead routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/lead", post(submit_lead))
}
