//! API handlers for LabTrack REST endpoints

pub mod health;
pub mod openapi;
pub mod reports;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Reports
        .route("/reports", get(reports::all_reports))
        .route("/reports/users", get(reports::user_listing))
        .route("/reports/users/institutional", get(reports::institutional_users))
        .route("/reports/users/by-role", get(reports::activity_by_role))
        .route(
            "/reports/laboratories/available",
            get(reports::available_laboratories),
        )
        .route(
            "/reports/laboratories/statistics",
            get(reports::laboratory_statistics),
        )
        .route("/reports/equipment/by-status", get(reports::equipment_by_status))
        .route(
            "/reports/equipment/attention",
            get(reports::equipment_needing_attention),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
