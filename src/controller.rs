//! AOP page controller.
//!
//! Owns all page state and recomputes the pipeline after every accepted
//! event. Views never mutate state directly; they send [`PageEvent`]s.

use crate::models::{Service, ServiceField};
use crate::pipeline::{
    apply_coarse_filters, apply_fine_filters_and_sort, export_csv, CoarseFilters, ColumnVisibility,
    DeepLinkParams, FineFilters, Selection, SortState,
};

/// User-originated mutations of page state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Change a pending coarse filter. Takes effect on the next `Retrieve`.
    SetCoarse {
        field: ServiceField,
        values: Vec<String>,
    },
    /// Apply the pending coarse filters.
    Retrieve,
    SetFine {
        field: ServiceField,
        pattern: String,
    },
    SortBy(ServiceField),
    ToggleItem(String),
    ToggleAll,
    ToggleColumn(ServiceField),
    /// A bulk update finished; carries the refreshed source.
    BulkCompleted(Vec<Service>),
}

type LoadingListener = Box<dyn FnMut(bool) + Send>;

pub struct AopController {
    source: Vec<Service>,
    pending: CoarseFilters,
    applied: CoarseFilters,
    fine: FineFilters,
    sort: SortState,
    selection: Selection,
    columns: ColumnVisibility,
    is_loading: bool,
    coarse_result: Vec<Service>,
    rows: Vec<Service>,
    loading_listener: Option<LoadingListener>,
}

impl AopController {
    /// Fresh page: no coarse restriction, no sort, nothing selected.
    pub fn new(source: Vec<Service>) -> Self {
        let coarse_result = source.clone();
        let mut controller = Self {
            source,
            pending: CoarseFilters::new(),
            applied: CoarseFilters::new(),
            fine: FineFilters::new(),
            sort: SortState::default(),
            selection: Selection::new(),
            columns: ColumnVisibility::default(),
            is_loading: false,
            coarse_result,
            rows: Vec::new(),
            loading_listener: None,
        };
        controller.recompute();
        controller
    }

    /// Page opened through a deep link. Any seeded filter triggers one
    /// automatic retrieve.
    pub fn from_deep_link(source: Vec<Service>, params: &DeepLinkParams) -> Self {
        let mut controller = Self::new(source);
        if params.seed(&mut controller.pending) {
            tracing::debug!("Deep link seeded coarse filters");
            controller.retrieve();
        }
        controller
    }

    pub fn with_columns(mut self, columns: ColumnVisibility) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Observe `is_loading` transitions.
    pub fn on_loading_change<F>(&mut self, listener: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.loading_listener = Some(Box::new(listener));
    }

    pub fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::SetCoarse { field, values } => {
                self.pending.set(field, values);
                return;
            }
            PageEvent::Retrieve => {
                self.retrieve();
                return;
            }
            PageEvent::SetFine { field, pattern } => self.fine.set(field, &pattern),
            PageEvent::SortBy(field) => self.sort.toggle(field),
            PageEvent::ToggleItem(id) => self.selection.toggle_item(&id),
            PageEvent::ToggleAll => self.selection.toggle_all(&self.rows),
            PageEvent::ToggleColumn(field) => self.columns.toggle_column(field),
            PageEvent::BulkCompleted(source) => {
                self.selection.clear();
                self.source = source;
                self.coarse_result = apply_coarse_filters(&self.source, &self.applied);
            }
        }
        self.recompute();
    }

    fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        if let Some(listener) = self.loading_listener.as_mut() {
            listener(loading);
        }
    }

    fn retrieve(&mut self) {
        self.set_loading(true);
        self.applied = self.pending.clone();
        self.coarse_result = apply_coarse_filters(&self.source, &self.applied);
        tracing::debug!(
            "Coarse filters kept {} of {} services",
            self.coarse_result.len(),
            self.source.len()
        );
        self.recompute();
        self.set_loading(false);
    }

    fn recompute(&mut self) {
        self.rows = apply_fine_filters_and_sort(&self.coarse_result, &self.fine, &self.sort);
    }

    /// Rows to render, after every stage.
    pub fn rows(&self) -> &[Service] {
        &self.rows
    }

    pub fn coarse_result(&self) -> &[Service] {
        &self.coarse_result
    }

    pub fn source(&self) -> &[Service] {
        &self.source
    }

    pub fn pending_filters(&self) -> &CoarseFilters {
        &self.pending
    }

    pub fn applied_filters(&self) -> &CoarseFilters {
        &self.applied
    }

    pub fn fine_filters(&self) -> &FineFilters {
        &self.fine
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected ids that are currently rendered.
    pub fn visible_selection(&self) -> Vec<String> {
        self.selection.visible_ids(&self.rows)
    }

    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.rows)
    }

    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// CSV of the rendered rows.
    pub fn export(&self) -> Vec<u8> {
        export_csv(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::{Category, Risk, Score};
    use crate::pipeline::SortDirection;

    fn source() -> Vec<Service> {
        let mut a = Service::new("CI1", "Payments", Category::Critical, Risk::High);
        a.incomplete_plan = true;
        a.ras_score = Some(Score::Extreme);
        let b = Service::new("CI2", "Analytics", Category::SaaS, Risk::Low);
        let mut c = Service::new("CI3", "Ledger", Category::Critical, Risk::Medium);
        c.ras_score = Some(Score::High);
        vec![a, b, c]
    }

    fn ids(rows: &[Service]) -> Vec<&str> {
        rows.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_pending_filters_wait_for_retrieve() {
        let mut page = AopController::new(source());
        page.dispatch(PageEvent::SetCoarse {
            field: ServiceField::Category,
            values: vec!["Critical".to_string()],
        });
        assert_eq!(page.rows().len(), 3);

        page.dispatch(PageEvent::Retrieve);
        assert_eq!(ids(page.rows()), ["CI1", "CI3"]);
    }

    #[test]
    fn test_loading_transitions_are_observable() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut page = AopController::new(source());
        let sink = Arc::clone(&seen);
        page.on_loading_change(move |loading| sink.lock().unwrap().push(loading));

        page.dispatch(PageEvent::Retrieve);

        assert_eq!(*seen.lock().unwrap(), [true, false]);
        assert!(!page.is_loading());
    }

    #[test]
    fn test_fine_filter_and_sort_are_live() {
        let mut page = AopController::new(source());
        page.dispatch(PageEvent::SetFine {
            field: ServiceField::Name,
            pattern: "E".to_string(),
        });
        assert_eq!(ids(page.rows()), ["CI1", "CI3"]);

        page.dispatch(PageEvent::SortBy(ServiceField::RasScore));
        page.dispatch(PageEvent::SortBy(ServiceField::RasScore));
        assert_eq!(page.sort(), SortState::by(ServiceField::RasScore, SortDirection::Desc));
        assert_eq!(ids(page.rows()), ["CI1", "CI3"]);
    }

    #[test]
    fn test_toggle_all_twice_returns_to_empty() {
        let mut page = AopController::new(source());
        page.dispatch(PageEvent::ToggleAll);
        assert!(page.all_selected());
        page.dispatch(PageEvent::ToggleAll);
        assert!(page.selection().is_empty());
    }

    #[test]
    fn test_stale_selection_not_visible() {
        let mut page = AopController::new(source());
        page.dispatch(PageEvent::ToggleItem("CI2".to_string()));
        page.dispatch(PageEvent::SetFine {
            field: ServiceField::Category,
            pattern: "critical".to_string(),
        });
        assert!(page.selection().contains("CI2"));
        assert!(page.visible_selection().is_empty());
    }

    #[test]
    fn test_deep_link_auto_retrieves() {
        let params = DeepLinkParams::from_pairs([("incompletePlan", "true")]);
        let page = AopController::from_deep_link(source(), &params);
        assert_eq!(ids(page.rows()), ["CI1"]);
        assert_eq!(page.applied_filters(), page.pending_filters());
    }

    #[test]
    fn test_bulk_completed_clears_selection_and_refreshes() {
        let mut page = AopController::new(source());
        page.dispatch(PageEvent::SetCoarse {
            field: ServiceField::Risk,
            values: vec!["High".to_string()],
        });
        page.dispatch(PageEvent::Retrieve);
        page.dispatch(PageEvent::ToggleAll);

        let mut refreshed = source();
        refreshed[1].risk = Risk::High;
        page.dispatch(PageEvent::BulkCompleted(refreshed));

        assert!(page.selection().is_empty());
        assert_eq!(ids(page.rows()), ["CI1", "CI2"]);
    }

    #[test]
    fn test_export_matches_rows() {
        let mut page = AopController::new(source());
        page.dispatch(PageEvent::SetFine {
            field: ServiceField::Id,
            pattern: "ci2".to_string(),
        });
        let csv = String::from_utf8(page.export()).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }
}
