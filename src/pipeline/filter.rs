//! Filter state for the coarse (retrieve) and fine (live) stages.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::ServiceField;

/// Sentinel selection meaning "no restriction".
pub const ALL: &str = "all";

/// Multi-value categorical filters, applied on explicit retrieve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoarseFilters {
    selections: BTreeMap<ServiceField, BTreeSet<String>>,
}

impl CoarseFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected values for a field.
    pub fn set<I, S>(&mut self, field: ServiceField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values
            .into_iter()
            .map(|v| {
                let v: String = v.into();
                v.trim().to_string()
            })
            .filter(|v| !v.is_empty())
            .collect();
        self.selections.insert(field, values);
    }

    /// Builder form of [`CoarseFilters::set`].
    pub fn with<I, S>(mut self, field: ServiceField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, values);
        self
    }

    /// Reset a field to "all".
    pub fn clear(&mut self, field: ServiceField) {
        self.selections.remove(&field);
    }

    pub fn get(&self, field: ServiceField) -> Option<&BTreeSet<String>> {
        self.selections.get(&field)
    }

    /// Selections that actually restrict the result set.
    pub fn active(&self) -> impl Iterator<Item = (ServiceField, &BTreeSet<String>)> {
        self.selections
            .iter()
            .filter(|(_, values)| is_restricting(values))
            .map(|(field, values)| (*field, values))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.active().next().is_none()
    }
}

/// A selection restricts only when non-empty and without the `all` sentinel.
pub(crate) fn is_restricting(values: &BTreeSet<String>) -> bool {
    !values.is_empty() && !values.iter().any(|v| v.eq_ignore_ascii_case(ALL))
}

/// Per-column substring patterns, applied live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FineFilters {
    patterns: BTreeMap<ServiceField, String>,
}

impl FineFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's pattern; stored lower-cased, empty removes it.
    pub fn set(&mut self, field: ServiceField, pattern: &str) {
        let pattern = pattern.to_lowercase();
        if pattern.is_empty() {
            self.patterns.remove(&field);
        } else {
            self.patterns.insert(field, pattern);
        }
    }

    pub fn with(mut self, field: ServiceField, pattern: &str) -> Self {
        self.set(field, pattern);
        self
    }

    pub fn get(&self, field: ServiceField) -> &str {
        self.patterns.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn active(&self) -> impl Iterator<Item = (ServiceField, &str)> {
        self.patterns.iter().map(|(field, p)| (*field, p.as_str()))
    }
}
