//! REST endpoint handlers.

pub mod lead;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all routes. Everything is mounted at the root.
pub fn routes() -> Router<AppState> {
    Router::new().merge(lead::routes()).merge(system::routes())
}
