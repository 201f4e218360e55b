//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Roster CRUD
        .route("/rosters", get(handlers::list_rosters))
        .route("/rosters", post(handlers::create_roster))
        .route("/rosters/{roster_id}", get(handlers::get_roster))
        .route("/rosters/{roster_id}", delete(handlers::delete_roster))
        // Job management
        .route("/jobs/{job_id}", get(handlers::get_job_status))
        .route("/jobs/{job_id}/logs", get(handlers::stream_job_logs))
        // Analysis endpoints
        .route("/rosters/{roster_id}/availability", get(handlers::get_availability))
        .route("/rosters/{roster_id}/availability-grid", get(handlers::get_availability_grid))
        .route("/rosters/{roster_id}/quotas", get(handlers::get_quotas))
        .route("/rosters/{roster_id}/workload", get(handlers::get_workload))
        .route("/rosters/{roster_id}/alerts", get(handlers::get_alerts))
        .route("/rosters/{roster_id}/summary", get(handlers::get_summary))
        .route("/rosters/{roster_id}/candidate-preview", post(handlers::preview_candidate));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Allow large roster payloads during uploads.
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_creation() {
        let state = AppState::new();
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
