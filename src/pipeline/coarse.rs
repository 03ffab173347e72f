//! Coarse filter stage: categorical multi-select filters.

use std::collections::BTreeSet;

use crate::models::{Service, ServiceField};

use super::filter::CoarseFilters;

/// Apply coarse filters to the full source collection.
///
/// Fields combine with AND; values within a field combine with OR. Flag
/// fields compare by equality, every other field by case-insensitive
/// substring.
pub fn apply_coarse_filters(source: &[Service], filters: &CoarseFilters) -> Vec<Service> {
    let active: Vec<_> = filters.active().collect();
    if active.is_empty() {
        return source.to_vec();
    }

    let matchers: Vec<Matcher> = active
        .into_iter()
        .map(|(field, values)| Matcher::new(field, values))
        .collect();

    source
        .iter()
        .filter(|service| matchers.iter().all(|m| m.matches(service)))
        .cloned()
        .collect()
}

enum Matcher {
    Flag {
        field: ServiceField,
        accepted: Vec<bool>,
    },
    Substring {
        field: ServiceField,
        needles: Vec<String>,
    },
}

impl Matcher {
    fn new(field: ServiceField, values: &BTreeSet<String>) -> Self {
        if field.is_flag() {
            let accepted = values.iter().filter_map(|v| parse_flag(v)).collect();
            Matcher::Flag { field, accepted }
        } else {
            let needles = values.iter().map(|v| v.to_lowercase()).collect();
            Matcher::Substring { field, needles }
        }
    }

    fn matches(&self, service: &Service) -> bool {
        match self {
            Matcher::Flag { field, accepted } => field
                .flag(service)
                .is_some_and(|value| accepted.contains(&value)),
            Matcher::Substring { field, needles } => {
                let haystack = field.value(service).to_lowercase();
                needles.iter().any(|needle| haystack.contains(needle.as_str()))
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
