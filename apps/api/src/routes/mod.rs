pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // HTML front end
        .route(
            "/",
            get(handlers::handle_index).post(handlers::handle_index_submit),
        )
        // Matching API
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/match", post(handlers::handle_match))
        // Similarity API
        .route("/api/v1/similarity", post(handlers::handle_similarity))
        .route(
            "/api/v1/similarity/batch",
            post(handlers::handle_batch_similarity),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
