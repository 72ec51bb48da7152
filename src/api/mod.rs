//! REST API layer: route handlers, DTOs, and router composition.
//!
//! `POST /lead` and `GET /health` are mounted at the root. With the
//! `swagger-ui` feature the OpenAPI document is served at
//! `/api-docs/openapi.json` and browsable at `/docs`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::GatewayConfig;

/// Lead pipelines make at most five sequential CRM calls; the response
/// deadline leaves room for all of them plus one. Expiry only drops the
/// response, the detached pipeline keeps running.
const RESPONSE_DEADLINE_FACTOR: u32 = 6;

/// Builds the API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    handlers::routes()
}

/// Builds the complete application: routes, docs, and middleware.
pub fn build_app(state: AppState, config: &GatewayConfig) -> Router {
    let router = Router::new().merge(build_router());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        router.merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            config.crm_timeout.saturating_mul(RESPONSE_DEADLINE_FACTOR),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(config.allowed_origins.cors_layer())
        .with_state(state)
}
