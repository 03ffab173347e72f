//! Shared helper functions for CLI commands.

use anyhow::Context;

use crate::config::Settings;
use crate::models::ServiceField;
use crate::repository::ServiceDataset;

/// Load the configured dataset, with the path in the error.
pub async fn load_dataset(settings: &Settings) -> anyhow::Result<ServiceDataset> {
    ServiceDataset::load(&settings.dataset)
        .await
        .with_context(|| format!("Could not load dataset {}", settings.dataset.display()))
}

/// Parse a column key argument.
pub fn parse_field(key: &str) -> anyhow::Result<ServiceField> {
    ServiceField::from_key(key.trim()).ok_or_else(|| {
        let known: Vec<&str> = ServiceField::ALL.iter().map(|f| f.key()).collect();
        anyhow::anyhow!("Unknown column '{}' (expected one of: {})", key, known.join(", "))
    })
}

/// Split a `FIELD=VALUE` argument.
pub fn parse_assignment(arg: &str) -> anyhow::Result<(ServiceField, &str)> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected FIELD=VALUE, got '{}'", arg))?;
    Ok((parse_field(key)?, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (field, value) = parse_assignment("rasScore=Very High").unwrap();
        assert_eq!(field, ServiceField::RasScore);
        assert_eq!(value, "Very High");

        assert!(parse_assignment("rasScore").is_err());
        assert!(parse_assignment("colour=red").is_err());
    }
}
