//! Single service edit page.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::super::template_structs::{CheckboxField, EditTemplate, SelectField};
use super::super::AppState;
use super::helpers::{not_found_page, render, update_error_status};
use crate::forms::{EditForm, EditPage};
use crate::models::{Category, Risk, Score, Service, ServiceField};
use crate::repository::ServiceStore;

#[derive(Debug, Default, Deserialize)]
pub struct EditParams {
    #[serde(default)]
    pub saved: Option<String>,
}

fn edit_template<'a>(
    service: &Service,
    form: &EditForm,
    message: String,
    error: String,
) -> EditTemplate<'a> {
    let choose = ("", "Select...");
    let scores = || Score::BY_SEVERITY.iter().map(|s| s.as_str());

    let selects = vec![
        SelectField::single(
            "category",
            ServiceField::Category.label(),
            choose,
            Category::ALL.iter().map(|c| c.as_str()),
            &form.category,
        ),
        SelectField::single(
            "business_risk",
            ServiceField::Risk.label(),
            choose,
            Risk::ALL.iter().map(|r| r.as_str()),
            &form.business_risk,
        ),
        SelectField::single(
            "ras_score",
            ServiceField::RasScore.label(),
            choose,
            scores(),
            &form.ras_score,
        ),
        SelectField::single(
            "residual_score",
            ServiceField::ResidualScore.label(),
            choose,
            scores(),
            &form.residual_score,
        ),
    ];

    let flags = [
        ("incomplete_plan", ServiceField::IncompletePlan, form.incomplete_plan),
        (
            "remediation_expired",
            ServiceField::RemediationExpired,
            form.remediation_expired,
        ),
        (
            "invalid_selection",
            ServiceField::InvalidSelection,
            form.invalid_selection,
        ),
    ]
    .into_iter()
    .map(|(name, field, checked)| CheckboxField {
        name: name.to_string(),
        label: field.label().to_string(),
        checked,
    })
    .collect();

    EditTemplate {
        title: "Edit Service",
        service_id: service.id.clone(),
        action: format!("/edit/{}", urlencoding::encode(&service.id)),
        name: service.name.clone(),
        eos_date: service.eos_date.clone(),
        selects,
        plan: form.plan.clone(),
        flags,
        message,
        error,
    }
}

fn unknown_service(id: &str) -> Response {
    not_found_page(format!("Service {} was not found.", id))
}

/// Edit form for one service.
pub async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<EditParams>,
) -> Response {
    match EditPage::resolve(&id, state.store.get(&id).await) {
        EditPage::Found { service, form } => {
            let message = if params.saved.is_some() {
                "Changes saved.".to_string()
            } else {
                String::new()
            };
            Html(render(&edit_template(&service, &form, message, String::new()))).into_response()
        }
        EditPage::NotFound { id } => unknown_service(&id),
    }
}

/// Save the edit form. Only changed fields are written.
pub async fn edit_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<EditForm>,
) -> Response {
    let Some(service) = state.store.get(&id).await else {
        return unknown_service(&id);
    };
    let saved = Redirect::to(&format!("/edit/{}?saved=1", urlencoding::encode(&id)));

    let result = match form.to_update(&service) {
        Ok(update) if update.is_empty() => return saved.into_response(),
        Ok(update) => state.store.apply_update(&[id.clone()], &update).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => {
            tracing::info!("Updated service {}", id);
            saved.into_response()
        }
        Err(e) => {
            tracing::warn!("Edit of {} rejected: {}", id, e);
            (
                update_error_status(&e),
                Html(render(&edit_template(&service, &form, String::new(), e.to_string()))),
            )
                .into_response()
        }
    }
}
