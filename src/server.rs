use crate::{app_state::AppState, handlers};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes and middleware
///
/// This function is used by both main.rs and integration tests to ensure
/// the same server configuration is used in both production and tests.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        // Every GET resolves to either a synthesized listing or the object
        .route("/", get(handlers::serve_path))
        .route("/{*path}", get(handlers::serve_path))
        .with_state(app_state)
        // Add tracing
        .layer(TraceLayer::new_for_http())
}
