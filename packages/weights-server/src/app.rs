//! Application setup and router.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use factsheet_weights::WeightsWorkflow;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{health_handler, weights_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<WeightsWorkflow>,
}

/// Build the Axum application router
pub fn build_app(workflow: Arc<WeightsWorkflow>) -> Router {
    let app_state = AppState { workflow };

    Router::new()
        .route("/api/weights", post(weights_handler))
        .route("/api/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
