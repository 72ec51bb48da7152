//! lead-gateway server entry point.
//!
//! Loads configuration, wires the CRM client into the lead pipeline,
//! and starts the Axum HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lead_gateway::api;
use lead_gateway::app_state::AppState;
use lead_gateway::config::{GatewayConfig, LogFormat};
use lead_gateway::crm::{BitrixClient, CrmApi};
use lead_gateway::service::LeadService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting lead-gateway");
    if config.crm_webhook.is_none() {
        tracing::warn!("BITRIX_WEBHOOK is not set; /lead will answer with a configuration error");
    }

    // Build CRM client and service layer
    let crm: Arc<dyn CrmApi> = Arc::new(
        BitrixClient::new(config.crm_webhook.as_deref(), config.crm_timeout)
            .context("failed to build CRM client")?,
    );
    let lead_service = Arc::new(LeadService::new(crm, &config));

    // Build router
    let app = api::build_app(AppState { lead_service }, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
