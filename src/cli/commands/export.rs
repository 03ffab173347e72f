//! CSV export command.

use std::path::Path;

use console::style;

use super::helpers::{load_dataset, parse_assignment, parse_field};
use crate::cli::icons::success;
use crate::config::Settings;
use crate::controller::{AopController, PageEvent};
use crate::models::ServiceField;
use crate::pipeline::{SortDirection, SortState};

/// Filters and sort requested on the command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportRequest {
    coarse: Vec<(ServiceField, Vec<String>)>,
    fine: Vec<(ServiceField, String)>,
    sort: Option<SortState>,
}

impl ExportRequest {
    pub fn parse(
        filters: &[String],
        searches: &[String],
        sort: Option<&str>,
        desc: bool,
    ) -> anyhow::Result<Self> {
        let mut request = Self::default();
        for arg in filters {
            let (field, values) = parse_assignment(arg)?;
            let values = values.split(',').map(|v| v.trim().to_string()).collect();
            request.coarse.push((field, values));
        }
        for arg in searches {
            let (field, pattern) = parse_assignment(arg)?;
            request.fine.push((field, pattern.to_string()));
        }
        if let Some(key) = sort {
            let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
            request.sort = Some(SortState::by(parse_field(key)?, direction));
        }
        Ok(request)
    }

    /// Page events reproducing this request.
    pub fn events(&self) -> Vec<PageEvent> {
        let mut events: Vec<PageEvent> = self
            .coarse
            .iter()
            .map(|(field, values)| PageEvent::SetCoarse {
                field: *field,
                values: values.clone(),
            })
            .collect();
        if !self.coarse.is_empty() {
            events.push(PageEvent::Retrieve);
        }
        events.extend(self.fine.iter().map(|(field, pattern)| PageEvent::SetFine {
            field: *field,
            pattern: pattern.clone(),
        }));
        if let Some(SortState {
            column: Some(column),
            direction,
        }) = self.sort
        {
            events.push(PageEvent::SortBy(column));
            if direction == SortDirection::Desc {
                events.push(PageEvent::SortBy(column));
            }
        }
        events
    }
}

/// Write the filtered services as CSV to `output` or stdout.
pub async fn cmd_export(
    settings: &Settings,
    request: &ExportRequest,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let dataset = load_dataset(settings).await?;
    let mut page = AopController::new(dataset.services().to_vec());
    for event in request.events() {
        page.dispatch(event);
    }

    let csv = page.export();
    match output {
        Some(path) => {
            tokio::fs::write(path, &csv).await?;
            eprintln!(
                "{} Exported {} of {} services to {}",
                success(),
                style(page.rows().len()).cyan(),
                dataset.len(),
                path.display()
            );
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&csv)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_to_events() {
        let request = ExportRequest::parse(
            &["category=Critical, SaaS".to_string()],
            &["name=pay".to_string()],
            Some("risk"),
            true,
        )
        .unwrap();

        assert_eq!(
            request.events(),
            vec![
                PageEvent::SetCoarse {
                    field: ServiceField::Category,
                    values: vec!["Critical".to_string(), "SaaS".to_string()],
                },
                PageEvent::Retrieve,
                PageEvent::SetFine {
                    field: ServiceField::Name,
                    pattern: "pay".to_string(),
                },
                PageEvent::SortBy(ServiceField::Risk),
                PageEvent::SortBy(ServiceField::Risk),
            ]
        );
    }

    #[test]
    fn test_unknown_sort_column() {
        assert!(ExportRequest::parse(&[], &[], Some("colour"), false).is_err());
    }
}
