use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::ApiState;

pub fn create_router(state: Arc<ApiState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(HandleErrorLayer::new(|_: BoxError| async {
            StatusCode::REQUEST_TIMEOUT
        }))
        .timeout(timeout);

    Router::new()
        .route("/api/daily_usage", post(handlers::create_usage))
        .route("/api/daily_usage/:device_id", get(handlers::list_usage))
        .route(
            "/api/daily_usage/:device_id/:day",
            get(handlers::get_usage).put(handlers::upsert_usage),
        )
        .route("/api/feedback", post(handlers::submit_feedback))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(middleware)
}
