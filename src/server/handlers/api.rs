//! JSON API endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::super::page_query::PageQuery;
use super::super::AppState;
use super::helpers::{update_error_json, ErrorResponse};
use crate::dashboard::{DashboardSummary, RecalculationError};
use crate::forms::{ServiceUpdate, UpdateError};
use crate::repository::ServiceStore;

/// Health check endpoint for container orchestration.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let services = state.store.read().await.len();
    Json(serde_json::json!({
        "status": "ok",
        "services": services
    }))
}

/// Rows for the same query keys the AOP page accepts.
pub async fn api_services(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let page = PageQuery::from_pairs(&pairs)
        .controller(state.store.snapshot().await, &state.default_columns);

    Json(serde_json::json!({
        "total": page.source().len(),
        "count": page.rows().len(),
        "services": page.rows()
    }))
}

pub async fn api_service(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Some(service) => Json(service).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Service {} not found", id),
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub update: ServiceUpdate,
}

/// Apply one update to many services. Rejected with 409 while another bulk
/// update is in flight.
pub async fn api_bulk_update(
    State(state): State<AppState>,
    Json(body): Json<BulkUpdateRequest>,
) -> Response {
    let Some(_guard) = state.bulk_busy.try_acquire() else {
        return update_error_json(&UpdateError::Busy);
    };

    match state.store.apply_update(&body.ids, &body.update).await {
        Ok(updated) => {
            tracing::info!(
                "Bulk updated {} services ({})",
                updated,
                body.update.touched_fields().join(", ")
            );
            Json(serde_json::json!({
                "updated": updated,
                "fields": body.update.touched_fields()
            }))
            .into_response()
        }
        Err(e) => {
            tracing::warn!("Bulk update failed: {}", e);
            update_error_json(&e)
        }
    }
}

pub async fn api_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let summary = match state.recalculation.summary().await {
        Some(summary) => summary,
        None => DashboardSummary::compute(&state.store.snapshot().await),
    };
    Json(serde_json::json!({
        "summary": summary,
        "recalculation": state.recalculation.status().await
    }))
}

/// Start a background recalculation.
pub async fn api_recalculate(State(state): State<AppState>) -> Response {
    match state.recalculation.start(state.store.clone()) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "status": "started",
                "message": "Recalculation started"
            })),
        )
            .into_response(),
        Err(e @ RecalculationError::Busy) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

pub async fn api_recalculate_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": state.recalculation.status().await,
        "summary": state.recalculation.summary().await
    }))
}
