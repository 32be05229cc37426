use crate::http::handlers;
use crate::http::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/predict", post(handlers::predict))
        .route(
            "/api/specs",
            get(handlers::get_specs).post(handlers::submit_specs),
        )
        .with_state(state)
}
