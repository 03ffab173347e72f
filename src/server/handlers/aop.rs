//! Annual Operating Plan table page and bulk update dialog.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::super::page_query::{
    action_link, decode_query, encode_pairs, state_pairs, PageAction, PageQuery, COARSE_PREFIX,
};
use super::super::template_structs::{
    AopTemplate, CellView, ColumnHeader, ColumnToggle, HiddenField, RowView, SelectField,
    SelectOption, TextField,
};
use super::super::AppState;
use super::helpers::{render, update_error_status};
use crate::controller::{AopController, PageEvent};
use crate::forms::{BulkUpdateDialog, BulkUpdateForm, DATE_FORMAT_HINT, NO_CHANGE};
use crate::models::{Category, RemediationPlan, Risk, Score, ServiceField};
use crate::pipeline::{SortDirection, ALL};
use crate::repository::ServiceDataset;

/// AOP table page.
///
/// A request carrying an `action` applies it and redirects to the resulting
/// state, so reloading the page does not repeat the toggle.
pub async fn aop_page(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = PageQuery::from_pairs(&pairs);
    let page = query.controller(state.store.snapshot().await, &state.default_columns);

    if query.has_action() {
        let mut next = state_pairs(&page);
        if query.dialog {
            next.push(("dialog".to_string(), "bulk".to_string()));
        }
        return Redirect::to(&format!("/aop?{}", encode_pairs(&next))).into_response();
    }

    let mut dialog = BulkUpdateDialog::new(state.bulk_busy.clone());
    if query.dialog {
        dialog.open();
    }

    let flash = pairs
        .iter()
        .find(|(k, _)| k == "updated")
        .map(|(_, n)| format!("Updated {} services", n))
        .unwrap_or_default();

    let dataset = state.store.read().await;
    Html(render(&aop_template(&page, &dialog, &dataset, flash))).into_response()
}

/// Bulk update form post: page state plus dialog fields.
#[derive(Debug, Deserialize)]
pub struct BulkUpdatePost {
    #[serde(default)]
    pub state: String,
    #[serde(flatten)]
    pub form: BulkUpdateForm,
}

/// Apply the bulk update dialog to the visible selection.
pub async fn aop_bulk_update(
    State(state): State<AppState>,
    Form(post): Form<BulkUpdatePost>,
) -> Response {
    let query = PageQuery::from_pairs(&decode_query(&post.state));
    let mut page = query.controller(state.store.snapshot().await, &state.default_columns);
    let ids = page.visible_selection();

    let mut dialog = BulkUpdateDialog::new(state.bulk_busy.clone());
    dialog.open();
    dialog.set_form(post.form);

    match dialog.submit(&ids, &state.store).await {
        Ok(updated) => {
            page.dispatch(PageEvent::BulkCompleted(state.store.snapshot().await));
            let mut pairs = state_pairs(&page);
            pairs.push(("updated".to_string(), updated.to_string()));
            Redirect::to(&format!("/aop?{}", encode_pairs(&pairs))).into_response()
        }
        Err(e) => {
            let status = update_error_status(&e);
            let dataset = state.store.read().await;
            (
                status,
                Html(render(&aop_template(&page, &dialog, &dataset, String::new()))),
            )
                .into_response()
        }
    }
}

/// Columns offered as dropdown filters above the table.
const FILTER_FIELDS: [ServiceField; 12] = [
    ServiceField::Division,
    ServiceField::ServiceOwner,
    ServiceField::ServiceManager,
    ServiceField::Category,
    ServiceField::Risk,
    ServiceField::RasScore,
    ServiceField::ResidualScore,
    ServiceField::SensitivityTier,
    ServiceField::TechCyberReviewStatus,
    ServiceField::IncompletePlan,
    ServiceField::RemediationExpired,
    ServiceField::InvalidSelection,
];

/// Options offered for a coarse filter column.
fn filter_values(field: ServiceField, dataset: &ServiceDataset) -> Vec<String> {
    let labels: Vec<&str> = match field {
        ServiceField::Category => Category::ALL.iter().map(|c| c.as_str()).collect(),
        ServiceField::Risk => Risk::ALL.iter().map(|r| r.as_str()).collect(),
        ServiceField::RasScore | ServiceField::ResidualScore => {
            Score::BY_SEVERITY.iter().map(|s| s.as_str()).collect()
        }
        f if f.is_flag() => vec!["true", "false"],
        _ => return dataset.distinct_values(field),
    };
    labels.into_iter().map(str::to_string).collect()
}

fn coarse_selects(page: &AopController, dataset: &ServiceDataset) -> Vec<SelectField> {
    FILTER_FIELDS
        .into_iter()
        .map(|field| {
            let applied = page
                .applied_filters()
                .active()
                .find(|(f, _)| *f == field)
                .map(|(_, values)| values);
            let mut options = vec![SelectOption {
                value: ALL.to_string(),
                label: "All".to_string(),
                selected: applied.is_none(),
            }];
            options.extend(filter_values(field, dataset).into_iter().map(|value| SelectOption {
                selected: applied.is_some_and(|values| values.contains(&value)),
                label: value.clone(),
                value,
            }));
            SelectField {
                name: format!("{}{}", COARSE_PREFIX, field.key()),
                label: field.label().to_string(),
                multiple: true,
                options,
            }
        })
        .collect()
}

fn bulk_fields(form: &BulkUpdateForm) -> (Vec<SelectField>, Vec<TextField>) {
    let no_change = (NO_CHANGE, "No change");
    let plans: Vec<&str> = RemediationPlan::ALL.iter().map(|p| p.as_str()).collect();

    let selects = vec![
        SelectField::single(
            "business_risk",
            "Business Risk",
            no_change,
            Risk::ALL.iter().map(|r| r.as_str()),
            &form.business_risk,
        ),
        SelectField::single("risk_fy", "Risk FY", no_change, plans.iter().copied(), &form.risk_fy),
        SelectField::single(
            "risk_fy_plus1",
            "Risk FY+1",
            no_change,
            plans.iter().copied(),
            &form.risk_fy_plus1,
        ),
        SelectField::single(
            "risk_fy_plus2",
            "Risk FY+2",
            no_change,
            plans.iter().copied(),
            &form.risk_fy_plus2,
        ),
        SelectField::single(
            "risk_fy_plus3",
            "Risk FY+3",
            no_change,
            plans.iter().copied(),
            &form.risk_fy_plus3,
        ),
        SelectField::single(
            "tech_cyber_review_status",
            "Tech & Cyber Review",
            no_change,
            ["true", "false"],
            &form.tech_cyber_review_status,
        ),
    ];

    let errors = form.date_errors();
    let text = |name: &str, label: &str, value: &str, placeholder: &str| TextField {
        name: name.to_string(),
        label: label.to_string(),
        value: value.to_string(),
        placeholder: placeholder.to_string(),
        error: errors.get(name).map(|e| e.to_string()).unwrap_or_default(),
    };

    let texts = vec![
        text(
            "planned_address_date",
            "Planned Address Date",
            &form.planned_address_date,
            "DD/MM/YYYY",
        ),
        text("review_date", "Review Date", &form.review_date, "DD/MM/YYYY"),
        text(
            "additional_treatment_commentary",
            "Additional Treatment Commentary",
            &form.additional_treatment_commentary,
            "",
        ),
        text(
            "risk_acceptance_rationale",
            "Risk Acceptance Rationale",
            &form.risk_acceptance_rationale,
            "",
        ),
        text(
            "eos_conditions_for_non_onboarded_assets",
            "EoS Conditions for Non-onboarded Assets",
            &form.eos_conditions_for_non_onboarded_assets,
            "",
        ),
        text(
            "impact_if_compromised",
            "Impact if Compromised",
            &form.impact_if_compromised,
            "",
        ),
        text(
            "suggested_action",
            "Suggested Action",
            &form.suggested_action,
            "",
        ),
        text(
            "risk_steward_comments",
            "Risk Steward Comments",
            &form.risk_steward_comments,
            "",
        ),
        text("nfrc", "NFRC", &form.nfrc, ""),
        text("evidence_url", "Evidence URL", &form.evidence_url, "https://"),
    ];

    (selects, texts)
}

fn aop_template<'a>(
    page: &AopController,
    dialog: &BulkUpdateDialog,
    dataset: &ServiceDataset,
    flash: String,
) -> AopTemplate<'a> {
    let state = state_pairs(page);
    let sort = page.sort();
    let columns = page.columns();

    let headers = columns
        .fields()
        .iter()
        .map(|&field| ColumnHeader {
            key: field.key().to_string(),
            label: field.label().to_string(),
            sort_link: action_link(&state, &PageAction::Sort(field)),
            sort_indicator: match (sort.column == Some(field), sort.direction) {
                (false, _) => "",
                (true, SortDirection::Asc) => "▲",
                (true, SortDirection::Desc) => "▼",
            },
            filter_value: page.fine_filters().get(field).to_string(),
        })
        .collect();

    let column_toggles = ServiceField::ALL
        .into_iter()
        .map(|field| ColumnToggle {
            label: field.label().to_string(),
            visible: columns.is_visible(field),
            link: action_link(&state, &PageAction::ToggleColumn(field)),
        })
        .collect();

    let rows = page
        .rows()
        .iter()
        .map(|service| RowView {
            id: service.id.clone(),
            edit_link: format!("/edit/{}", urlencoding::encode(&service.id)),
            selected: page.selection().contains(&service.id),
            toggle_link: action_link(&state, &PageAction::ToggleItem(service.id.clone())),
            cells: columns
                .fields()
                .iter()
                .map(|&field| CellView {
                    text: field.display(service).into_owned(),
                    class: match field {
                        ServiceField::RasScore => service.ras_score.map(|s| s.css_class()),
                        ServiceField::ResidualScore => {
                            service.residual_score.map(|s| s.css_class())
                        }
                        _ => None,
                    }
                    .unwrap_or_default()
                    .to_string(),
                })
                .collect(),
        })
        .collect();

    let hidden_without = |prefix: &str| {
        HiddenField::from_pairs(state.iter().filter(|(k, _)| !k.starts_with(prefix)))
    };

    let mut dialog_pairs = state.clone();
    dialog_pairs.push(("dialog".to_string(), "bulk".to_string()));
    let (bulk_selects, bulk_texts) = bulk_fields(dialog.form());

    let dialog_error = match dialog.last_error() {
        Some(_) if !dialog.form().date_errors().is_empty() => {
            format!("Some dates are invalid. {}", DATE_FORMAT_HINT)
        }
        Some(e) => e.to_string(),
        None => String::new(),
    };

    AopTemplate {
        title: "Annual Operating Plan",
        flash,
        total_services: page.source().len(),
        coarse_count: page.coarse_result().len(),
        row_count: page.rows().len(),
        coarse_filters: coarse_selects(page, dataset),
        coarse_hidden: hidden_without(COARSE_PREFIX),
        fine_hidden: hidden_without("q_"),
        headers,
        column_toggles,
        rows,
        all_selected: page.all_selected(),
        toggle_all_link: action_link(&state, &PageAction::ToggleAll),
        selected_count: page.visible_selection().len(),
        export_link: format!("/aop/export.csv?{}", encode_pairs(&state)),
        dialog_link: format!("/aop?{}", encode_pairs(&dialog_pairs)),
        close_dialog_link: format!("/aop?{}", encode_pairs(&state)),
        dialog_open: dialog.is_open(),
        dialog_error,
        state_query: encode_pairs(&state),
        bulk_selects,
        bulk_texts,
    }
}
