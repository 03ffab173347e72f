//! Dashboard page handler.

use axum::{extract::State, response::Html};

use super::super::template_structs::DashboardTemplate;
use super::super::AppState;
use super::helpers::render;
use crate::dashboard::DashboardSummary;

/// Dashboard page: KPI boxes and score heat maps from the last
/// recalculation.
pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let summary = match state.recalculation.summary().await {
        Some(summary) => summary,
        None => DashboardSummary::compute(&state.store.snapshot().await),
    };
    let status = state.recalculation.status().await;

    let last_recalculated = status
        .completed_at
        .unwrap_or(summary.computed_at)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();

    let template = DashboardTemplate {
        title: "Dashboard",
        total_services: summary.total_services,
        kpis: summary.kpis.kpis(),
        heat_maps: vec![summary.ras_heat_map, summary.residual_heat_map],
        recalculating: status.running,
        last_recalculated,
    };
    Html(render(&template))
}
