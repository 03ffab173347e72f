//! Row selection bookkeeping.

use std::collections::BTreeSet;

use crate::models::Service;

/// Selected record ids.
///
/// Ids left over from a wider earlier result are kept but never reported as
/// visible; see [`Selection::visible_ids`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn toggle_item(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Clear when every visible row is already selected, otherwise select
    /// exactly the visible rows.
    pub fn toggle_all(&mut self, visible: &[Service]) {
        if self.all_selected(visible) {
            self.ids.clear();
        } else {
            self.ids = visible.iter().map(|s| s.id.clone()).collect();
        }
    }

    /// True when the visible set is non-empty and fully selected.
    pub fn all_selected(&self, visible: &[Service]) -> bool {
        !visible.is_empty()
            && self.ids.len() == visible.len()
            && visible.iter().all(|s| self.ids.contains(&s.id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Selected ids present in `visible`, in display order.
    pub fn visible_ids(&self, visible: &[Service]) -> Vec<String> {
        visible
            .iter()
            .filter(|s| self.ids.contains(&s.id))
            .map(|s| s.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk};

    fn rows(ids: &[&str]) -> Vec<Service> {
        ids.iter()
            .map(|id| Service::new(*id, *id, Category::Critical, Risk::Low))
            .collect()
    }

    #[test]
    fn test_toggle_item_flips_membership() {
        let mut selection = Selection::new();
        selection.toggle_item("a");
        assert!(selection.contains("a"));
        selection.toggle_item("a");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_twice_returns_to_empty() {
        let visible = rows(&["a", "b", "c"]);
        let mut selection = Selection::new();
        selection.toggle_all(&visible);
        assert_eq!(selection.len(), 3);
        selection.toggle_all(&visible);
        assert_eq!(selection, Selection::new());
    }

    #[test]
    fn test_toggle_all_selects_visible_not_source() {
        let visible = rows(&["b"]);
        let mut selection = Selection::from_ids(["a"]);
        selection.toggle_all(&visible);
        assert_eq!(selection.ids().collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn test_toggle_all_on_empty_visible_selects_nothing() {
        let mut selection = Selection::new();
        selection.toggle_all(&[]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_stale_ids_are_not_visible() {
        let selection = Selection::from_ids(["a", "z"]);
        let visible = rows(&["a", "b"]);
        assert_eq!(selection.visible_ids(&visible), ["a"]);
        assert!(!selection.all_selected(&visible));
    }
}
