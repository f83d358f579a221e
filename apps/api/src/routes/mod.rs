pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Document API
        .route("/api/inspect", post(handlers::handle_inspect))
        .route("/api/render", post(handlers::handle_render))
        .route("/api/send", post(handlers::handle_send))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
