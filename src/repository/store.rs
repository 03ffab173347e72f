//! Write-back contract for edits and its in-memory implementation.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::dataset::ServiceDataset;
use crate::forms::{ServiceUpdate, UpdateError};
use crate::models::Service;

/// Destination for bulk and single-record updates.
#[async_trait]
pub trait ServiceStore: Send + Sync {
    /// Apply `update` to every id; returns the number of records changed.
    async fn apply_update(&self, ids: &[String], update: &ServiceUpdate) -> Result<usize, UpdateError>;
}

/// Shared dataset handle that accepts write-back.
///
/// Edits always land in memory. With a persist path set, the updated dataset
/// is written to disk before the in-memory copy is replaced, so a failed
/// write leaves both unchanged.
#[derive(Clone)]
pub struct DatasetStore {
    dataset: Arc<RwLock<ServiceDataset>>,
    persist_path: Option<PathBuf>,
}

impl DatasetStore {
    pub fn new(dataset: ServiceDataset) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(dataset)),
            persist_path: None,
        }
    }

    pub fn with_persistence(mut self, path: PathBuf) -> Self {
        self.persist_path = Some(path);
        self
    }

    /// Copy of the current collection.
    pub async fn snapshot(&self) -> Vec<Service> {
        self.dataset.read().await.services().to_vec()
    }

    pub async fn get(&self, id: &str) -> Option<Service> {
        self.dataset.read().await.get(id).cloned()
    }

    /// Read access for callers that only inspect the dataset.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, ServiceDataset> {
        self.dataset.read().await
    }
}

#[async_trait]
impl ServiceStore for DatasetStore {
    async fn apply_update(&self, ids: &[String], update: &ServiceUpdate) -> Result<usize, UpdateError> {
        let mut guard = self.dataset.write().await;

        let mut next = guard.clone();
        let updated = next.apply_update(ids, update)?;

        if let Some(ref path) = self.persist_path {
            let json = next
                .to_json_pretty()
                .map_err(|e| UpdateError::Persist(e.to_string()))?;
            tokio::fs::write(path, json)
                .await
                .map_err(|e| UpdateError::Persist(format!("{}: {}", path.display(), e)))?;
            tracing::debug!("Persisted dataset to {}", path.display());
        }

        *guard = next;
        tracing::info!(
            "Updated {} services ({})",
            updated,
            update.touched_fields().join(", ")
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk};

    fn dataset() -> ServiceDataset {
        ServiceDataset::from_services(vec![
            Service::new("CI1", "Payroll", Category::Critical, Risk::Low),
            Service::new("CI2", "Portal", Category::SaaS, Risk::Medium),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_lands_in_memory() {
        let store = DatasetStore::new(dataset());
        let update = ServiceUpdate {
            incomplete_plan: Some(true),
            ..Default::default()
        };
        let n = store.apply_update(&["CI2".to_string()], &update).await.unwrap();
        assert_eq!(n, 1);
        assert!(store.get("CI2").await.unwrap().incomplete_plan);
        assert!(!store.get("CI1").await.unwrap().incomplete_plan);
    }

    #[tokio::test]
    async fn test_update_persists_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        let store = DatasetStore::new(dataset()).with_persistence(path.clone());

        let update = ServiceUpdate {
            plan: Some("Decommission 2025".to_string()),
            ..Default::default()
        };
        store.apply_update(&["CI1".to_string()], &update).await.unwrap();

        let reloaded = ServiceDataset::load(&path).await.unwrap();
        assert_eq!(reloaded.get("CI1").unwrap().plan, "Decommission 2025");
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("services.json");
        let store = DatasetStore::new(dataset()).with_persistence(path);

        let update = ServiceUpdate {
            risk: Some(Risk::High),
            ..Default::default()
        };
        let err = store.apply_update(&["CI1".to_string()], &update).await.unwrap_err();
        assert!(matches!(err, UpdateError::Persist(_)));
        assert_eq!(store.get("CI1").await.unwrap().risk, Risk::Low);
    }
}
