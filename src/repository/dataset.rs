//! In-memory service dataset loaded from a JSON file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forms::{ServiceUpdate, UpdateError};
use crate::models::{Service, ServiceField};

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate service id: {0}")]
    DuplicateId(String),

    #[error("Empty service id at position {0}")]
    EmptyId(usize),
}

/// On-disk layouts: `{"services": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Wrapped { services: Vec<Service> },
    Bare(Vec<Service>),
}

#[derive(Serialize)]
struct DatasetFileRef<'a> {
    services: &'a [Service],
}

/// The full service collection with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDataset {
    services: Vec<Service>,
}

impl ServiceDataset {
    /// Build a dataset, rejecting empty or duplicate ids.
    pub fn from_services(services: Vec<Service>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(services.len());
        for (pos, service) in services.iter().enumerate() {
            if service.id.trim().is_empty() {
                return Err(DatasetError::EmptyId(pos));
            }
            if !seen.insert(service.id.as_str()) {
                return Err(DatasetError::DuplicateId(service.id.clone()));
            }
        }
        Ok(Self { services })
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let services = match serde_json::from_str(json)? {
            DatasetFile::Wrapped { services } => services,
            DatasetFile::Bare(services) => services,
        };
        Self::from_services(services)
    }

    pub async fn load(path: &Path) -> Result<Self, DatasetError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DatasetError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let dataset = Self::from_json_str(&contents)?;
        tracing::info!(
            "Loaded {} services from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Serialize in the wrapped layout.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&DatasetFileRef {
            services: &self.services,
        })
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Distinct values of a field in first-seen order, for filter options.
    pub fn distinct_values(&self, field: ServiceField) -> Vec<String> {
        let mut seen = HashSet::new();
        self.services
            .iter()
            .map(|s| field.value(s).into_owned())
            .filter(|v| !v.is_empty() && seen.insert(v.clone()))
            .collect()
    }

    /// Apply a partial update to every listed record.
    ///
    /// Dates are validated and all ids resolved before anything is written,
    /// so a bad date or an unknown id leaves the dataset untouched.
    pub fn apply_update(&mut self, ids: &[String], update: &ServiceUpdate) -> Result<usize, UpdateError> {
        if ids.is_empty() {
            return Err(UpdateError::NothingSelected);
        }
        update.validate()?;

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| self.get(id).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(UpdateError::NotFound(missing));
        }

        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut updated = 0;
        for service in self.services.iter_mut().filter(|s| targets.contains(s.id.as_str())) {
            update.apply(service);
            updated += 1;
        }
        Ok(updated)
    }
}
