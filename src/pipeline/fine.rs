//! Fine filter and sort stage, layered on the coarse result.

use crate::models::{Service, ServiceField};

use super::filter::FineFilters;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Current sort column and direction. No column means input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<ServiceField>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(column: ServiceField, direction: SortDirection) -> Self {
        Self {
            column: Some(column),
            direction,
        }
    }

    /// Header click: same column flips direction, another column switches
    /// key and resets to ascending.
    pub fn toggle(&mut self, column: ServiceField) {
        if self.column == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }
}

/// Apply live substring filters, then a stable sort.
pub fn apply_fine_filters_and_sort(
    coarse_result: &[Service],
    fine_filters: &FineFilters,
    sort: &SortState,
) -> Vec<Service> {
    let patterns: Vec<(ServiceField, &str)> = fine_filters.active().collect();

    let mut result: Vec<Service> = coarse_result
        .iter()
        .filter(|service| {
            patterns.iter().all(|(field, pattern)| {
                field.value(service).to_lowercase().contains(pattern)
            })
        })
        .cloned()
        .collect();

    if let Some(column) = sort.column {
        // sort_by is stable; ties keep input order in both directions
        result.sort_by(|a, b| {
            let ordering = column.sort_key(a).cmp(&column.sort_key(b));
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk, Score};

    fn sample() -> Vec<Service> {
        let mut services = vec![
            Service::new("CI1", "Alpha", Category::Critical, Risk::High),
            Service::new("CI2", "beta", Category::SaaS, Risk::Low),
            Service::new("CI3", "Gamma", Category::Critical, Risk::High),
            Service::new("CI4", "Delta", Category::NonCritical, Risk::Medium),
        ];
        services[0].ras_score = Some(Score::Medium);
        services[1].ras_score = Some(Score::Extreme);
        services[3].ras_score = Some(Score::Compliant);
        services
    }

    fn ids(services: &[Service]) -> Vec<&str> {
        services.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_patterns_are_case_insensitive_and_anded() {
        let source = sample();
        let fine = FineFilters::new()
            .with(ServiceField::Name, "A")
            .with(ServiceField::Category, "crit");
        let result = apply_fine_filters_and_sort(&source, &fine, &SortState::default());
        // Non-critical also contains "crit"
        assert_eq!(ids(&result), ["CI1", "CI3", "CI4"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let source = sample();
        let sort = SortState::by(ServiceField::Risk, SortDirection::Desc);
        let result = apply_fine_filters_and_sort(&source, &FineFilters::new(), &sort);
        assert_eq!(ids(&result), ["CI1", "CI3", "CI4", "CI2"]);

        let sort = SortState::by(ServiceField::Risk, SortDirection::Asc);
        let result = apply_fine_filters_and_sort(&source, &FineFilters::new(), &sort);
        assert_eq!(ids(&result), ["CI2", "CI4", "CI1", "CI3"]);
    }

    #[test]
    fn test_score_sort_uses_severity_missing_first() {
        let source = sample();
        let sort = SortState::by(ServiceField::RasScore, SortDirection::Asc);
        let result = apply_fine_filters_and_sort(&source, &FineFilters::new(), &sort);
        assert_eq!(ids(&result), ["CI3", "CI4", "CI1", "CI2"]);
    }

    #[test]
    fn test_eos_date_sorts_by_calendar_date() {
        let dated = |id: &str, date: &str| {
            let mut s = Service::new(id, id, Category::Critical, Risk::Low);
            s.eos_date = date.to_string();
            s
        };
        let source = vec![dated("CI1", "01/12/2025"), dated("CI2", "31/01/2024"), dated("CI3", "")];
        let sort = SortState::by(ServiceField::EosDate, SortDirection::Asc);
        let result = apply_fine_filters_and_sort(&source, &FineFilters::new(), &sort);
        assert_eq!(ids(&result), ["CI3", "CI2", "CI1"]);
    }

    #[test]
    fn test_toggle_twice_restores_order() {
        let source = sample();
        let mut sort = SortState::default();
        sort.toggle(ServiceField::Name);
        let first = apply_fine_filters_and_sort(&source, &FineFilters::new(), &sort);

        sort.toggle(ServiceField::Name);
        assert_eq!(sort.direction, SortDirection::Desc);
        sort.toggle(ServiceField::Name);
        let again = apply_fine_filters_and_sort(&source, &FineFilters::new(), &sort);
        assert_eq!(first, again);
    }

    #[test]
    fn test_toggle_other_column_resets_direction() {
        let mut sort = SortState::by(ServiceField::Name, SortDirection::Desc);
        sort.toggle(ServiceField::Division);
        assert_eq!(sort, SortState::by(ServiceField::Division, SortDirection::Asc));
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let source = sample();
        let fine = FineFilters::new().with(ServiceField::Name, "a");
        let sort = SortState::by(ServiceField::RasScore, SortDirection::Desc);
        let once = apply_fine_filters_and_sort(&source, &fine, &sort);
        let twice = apply_fine_filters_and_sort(&source, &fine, &sort);
        assert_eq!(once, twice);
    }
}
