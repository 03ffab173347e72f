//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard_page))
        // Annual Operating Plan table
        .route("/aop", get(handlers::aop_page))
        .route("/aop/export.csv", get(handlers::export_csv))
        .route("/aop/bulk-update", post(handlers::aop_bulk_update))
        .route(
            "/edit/:id",
            get(handlers::edit_page).post(handlers::edit_submit),
        )
        // JSON API
        .route("/api/services", get(handlers::api_services))
        .route("/api/services/bulk-update", post(handlers::api_bulk_update))
        .route("/api/services/:id", get(handlers::api_service))
        .route("/api/dashboard", get(handlers::api_dashboard))
        .route("/api/recalculate", post(handlers::api_recalculate))
        .route(
            "/api/recalculate/status",
            get(handlers::api_recalculate_status),
        )
        .route("/health", get(handlers::health))
        // Static assets
        .route("/static/style.css", get(handlers::serve_css))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
