//! OpenAPI document for the gateway.

use utoipa::OpenApi;

use super::dto::{HealthResponse, LeadResponse};
use super::handlers;
use crate::domain::LeadSubmission;
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI description of every public endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "lead-gateway",
        description = "Relays web-form lead submissions into the CRM as a contact, a deal, and follow-up reminders."
    ),
    paths(handlers::lead::submit_lead, handlers::system::health_handler),
    components(schemas(
        LeadSubmission,
        LeadResponse,
        HealthResponse,
        ErrorResponse,
        ErrorBody
    )),
    tags(
        (name = "Leads", description = "Lead intake"),
        (name = "System", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;
