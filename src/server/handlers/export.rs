//! CSV download of the visible rows.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};

use super::super::page_query::PageQuery;
use super::super::AppState;
use super::helpers::error_page;
use crate::pipeline::{CSV_CONTENT_TYPE, CSV_FILENAME};

/// Export exactly the rows the table shows for the same query.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let page = PageQuery::from_pairs(&pairs)
        .controller(state.store.snapshot().await, &state.default_columns);
    let body = page.export();
    tracing::debug!("Exporting {} rows", page.rows().len());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CSV_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", CSV_FILENAME),
        )
        .body(Body::from(body))
        .unwrap_or_else(|e| error_page(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
}
