//! Page view models rendered through askama.
//!
//! Handlers do all formatting; templates only loop and branch over these
//! plain string/bool structs.

use askama::Template;

use crate::dashboard::{HeatMap, Kpi};

/// Hidden form input carrying page state.
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

impl HiddenField {
    pub fn from_pairs<'a, I>(pairs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| Self {
                name: name.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

/// Option in a `<select>`.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Labelled `<select>` input.
pub struct SelectField {
    pub name: String,
    pub label: String,
    pub multiple: bool,
    pub options: Vec<SelectOption>,
}

impl SelectField {
    /// Single-choice select with a leading blank-valued option.
    pub fn single<'a, I>(name: &str, label: &str, blank: (&str, &str), values: I, current: &str) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut options = vec![SelectOption {
            value: blank.0.to_string(),
            label: blank.1.to_string(),
            selected: current.is_empty() || current == blank.0,
        }];
        options.extend(values.into_iter().map(|v| SelectOption {
            value: v.to_string(),
            label: v.to_string(),
            selected: v == current,
        }));
        Self {
            name: name.to_string(),
            label: label.to_string(),
            multiple: false,
            options,
        }
    }
}

/// Labelled text input with an optional inline error.
pub struct TextField {
    pub name: String,
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub error: String,
}

pub struct CheckboxField {
    pub name: String,
    pub label: String,
    pub checked: bool,
}

/// Column header with sort and live filter controls.
pub struct ColumnHeader {
    pub key: String,
    pub label: String,
    pub sort_link: String,
    pub sort_indicator: &'static str,
    pub filter_value: String,
}

/// Entry in the column chooser.
pub struct ColumnToggle {
    pub label: String,
    pub visible: bool,
    pub link: String,
}

pub struct CellView {
    pub text: String,
    pub class: String,
}

pub struct RowView {
    pub id: String,
    pub edit_link: String,
    pub selected: bool,
    pub toggle_link: String,
    pub cells: Vec<CellView>,
}

/// Dashboard page.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub title: &'a str,
    pub total_services: usize,
    pub kpis: Vec<Kpi>,
    pub heat_maps: Vec<HeatMap>,
    pub recalculating: bool,
    pub last_recalculated: String,
}

/// AOP table page.
#[derive(Template)]
#[template(path = "aop.html")]
pub struct AopTemplate<'a> {
    pub title: &'a str,
    pub flash: String,
    pub total_services: usize,
    pub coarse_count: usize,
    pub row_count: usize,
    pub coarse_filters: Vec<SelectField>,
    pub coarse_hidden: Vec<HiddenField>,
    pub fine_hidden: Vec<HiddenField>,
    pub headers: Vec<ColumnHeader>,
    pub column_toggles: Vec<ColumnToggle>,
    pub rows: Vec<RowView>,
    pub all_selected: bool,
    pub toggle_all_link: String,
    pub selected_count: usize,
    pub export_link: String,
    pub dialog_link: String,
    pub close_dialog_link: String,
    pub dialog_open: bool,
    pub dialog_error: String,
    pub state_query: String,
    pub bulk_selects: Vec<SelectField>,
    pub bulk_texts: Vec<TextField>,
}

/// Single service edit page.
#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate<'a> {
    pub title: &'a str,
    pub service_id: String,
    pub action: String,
    pub name: String,
    pub eos_date: String,
    pub selects: Vec<SelectField>,
    pub plan: String,
    pub flags: Vec<CheckboxField>,
    pub message: String,
    pub error: String,
}

/// Not found page.
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub title: &'a str,
    pub message: String,
}

/// Error page template.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub title: &'a str,
    pub message: &'a str,
}
