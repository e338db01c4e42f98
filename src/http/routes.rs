use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the webhook router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/webhook", post(handlers::webhook))
        // Request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
