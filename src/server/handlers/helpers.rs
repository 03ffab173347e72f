//! Helper types and utility functions for handlers.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::super::template_structs::{ErrorTemplate, NotFoundTemplate};
use crate::forms::UpdateError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Render a template, falling back to the error text.
pub fn render<T: Template>(template: &T) -> String {
    template.render().unwrap_or_else(|e| e.to_string())
}

/// HTTP status for a failed update.
pub fn update_error_status(error: &UpdateError) -> StatusCode {
    match error {
        UpdateError::Busy => StatusCode::CONFLICT,
        UpdateError::NotFound(_) => StatusCode::NOT_FOUND,
        UpdateError::NothingSelected
        | UpdateError::InvalidDate { .. }
        | UpdateError::InvalidValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        UpdateError::Persist(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error response for a failed update.
pub fn update_error_json(error: &UpdateError) -> Response {
    (
        update_error_status(error),
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Not-found page with a link back to the table.
pub fn not_found_page(message: String) -> Response {
    let template = NotFoundTemplate {
        title: "Not Found",
        message,
    };
    (StatusCode::NOT_FOUND, Html(render(&template))).into_response()
}

/// Generic error page.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let template = ErrorTemplate {
        title: "Error",
        message,
    };
    (status, Html(render(&template))).into_response()
}
