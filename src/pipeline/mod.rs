//! Tabular filter, sort, select and export pipeline.
//!
//! Data flows one way: source → coarse filters → fine filters + sort →
//! presentation / export. Selection and column visibility are side state
//! that only the presentation layer consumes.

mod coarse;
mod columns;
mod deep_link;
mod export;
mod filter;
mod fine;
mod selection;

pub use coarse::apply_coarse_filters;
pub use columns::ColumnVisibility;
pub use deep_link::{aop_link, DeepLinkParams};
pub use export::{export_csv, CSV_CONTENT_TYPE, CSV_FILENAME};
pub use filter::{CoarseFilters, FineFilters, ALL};
pub use fine::{apply_fine_filters_and_sort, SortDirection, SortState};
pub use selection::Selection;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk, Service, ServiceField};

    #[test]
    fn test_coarse_then_fine_scenario() {
        let source = vec![
            Service::new("CI1", "Payments API", Category::Critical, Risk::High),
            Service::new("CI2", "Analytics", Category::SaaS, Risk::Low),
            Service::new("CI3", "Core Ledger", Category::Critical, Risk::Medium),
        ];

        let coarse = CoarseFilters::new().with(ServiceField::Category, ["Critical"]);
        let coarse_result = apply_coarse_filters(&source, &coarse);
        assert_eq!(coarse_result.len(), 2);

        let fine = FineFilters::new().with(ServiceField::Name, "A");
        let rows = apply_fine_filters_and_sort(&coarse_result, &fine, &SortState::default());
        let ids: Vec<&str> = rows.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["CI1"]);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let source = vec![
            Service::new("CI1", "b", Category::Critical, Risk::High),
            Service::new("CI2", "a", Category::Critical, Risk::High),
            Service::new("CI3", "a", Category::SaaS, Risk::High),
        ];
        let coarse = CoarseFilters::new().with(ServiceField::Risk, ["high"]);
        let sort = SortState::by(ServiceField::Name, SortDirection::Asc);

        let first = apply_fine_filters_and_sort(
            &apply_coarse_filters(&source, &coarse),
            &FineFilters::new(),
            &sort,
        );
        let second = apply_fine_filters_and_sort(
            &apply_coarse_filters(&source, &coarse),
            &FineFilters::new(),
            &sort,
        );
        assert_eq!(first, second);
        assert_eq!(first.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), ["CI2", "CI3", "CI1"]);
    }
}
