use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all stowage endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/bundles", post(handler::create_bundle_handler))
        .route("/bundles", get(handler::list_bundles_handler))
        .route("/bundles/:id/download", get(handler::download_bundle_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
