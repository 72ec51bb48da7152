//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::LeadService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor. Immutable after start-up.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Lead pipeline.
    pub lead_service: Arc<LeadService>,
}
