//! Dashboard summary: KPI counters, score heat maps and the recalculation job.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Score, Service, ServiceField};
use crate::pipeline::aop_link;
use crate::repository::DatasetStore;
use crate::utils::BusyFlag;

/// One KPI box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpi {
    pub key: &'static str,
    pub title: &'static str,
    pub count: usize,
    pub link: String,
}

/// Record-issue counters over the whole dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub incomplete_plan: usize,
    pub remediation_expired: usize,
    pub invalid_selection: usize,
}

impl KpiSummary {
    pub fn from_services(services: &[Service]) -> Self {
        let count = |pred: fn(&Service) -> bool| services.iter().filter(|s| pred(s)).count();
        Self {
            incomplete_plan: count(|s| s.incomplete_plan),
            remediation_expired: count(|s| s.remediation_expired),
            invalid_selection: count(|s| s.invalid_selection),
        }
    }

    /// Boxes in display order, each linking to the AOP page filtered on its flag.
    pub fn kpis(&self) -> Vec<Kpi> {
        [
            (ServiceField::IncompletePlan, self.incomplete_plan),
            (ServiceField::RemediationExpired, self.remediation_expired),
            (ServiceField::InvalidSelection, self.invalid_selection),
        ]
        .into_iter()
        .map(|(field, count)| Kpi {
            key: field.key(),
            title: field.label(),
            count,
            link: aop_link(field, "true"),
        })
        .collect()
    }
}

/// Which score a heat map counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreKind {
    RasScore,
    ResidualScore,
}

impl ScoreKind {
    pub fn field(&self) -> ServiceField {
        match self {
            Self::RasScore => ServiceField::RasScore,
            Self::ResidualScore => ServiceField::ResidualScore,
        }
    }

    pub fn title(&self) -> &'static str {
        self.field().label()
    }

    fn score(&self, service: &Service) -> Option<Score> {
        match self {
            Self::RasScore => service.ras_score,
            Self::ResidualScore => service.residual_score,
        }
    }
}

/// Exact-match count for one score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatMapCell {
    pub score: Score,
    pub count: usize,
}

impl HeatMapCell {
    pub fn label(&self) -> &'static str {
        self.score.as_str()
    }

    pub fn css_class(&self) -> &'static str {
        self.score.css_class()
    }
}

/// Count per score category, highest severity first, zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatMap {
    pub kind: ScoreKind,
    pub cells: Vec<HeatMapCell>,
}

impl HeatMap {
    pub fn for_score(services: &[Service], kind: ScoreKind) -> Self {
        let cells = Score::BY_SEVERITY
            .into_iter()
            .map(|score| HeatMapCell {
                score,
                count: services
                    .iter()
                    .filter(|s| kind.score(s) == Some(score))
                    .count(),
            })
            .collect();
        Self { kind, cells }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_services: usize,
    pub kpis: KpiSummary,
    pub ras_heat_map: HeatMap,
    pub residual_heat_map: HeatMap,
    pub computed_at: DateTime<Utc>,
}

impl DashboardSummary {
    pub fn compute(services: &[Service]) -> Self {
        Self {
            total_services: services.len(),
            kpis: KpiSummary::from_services(services),
            ras_heat_map: HeatMap::for_score(services, ScoreKind::RasScore),
            residual_heat_map: HeatMap::for_score(services, ScoreKind::ResidualScore),
            computed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecalculationError {
    #[error("A recalculation is already in progress")]
    Busy,
}

/// Status of the recalculation job (only one can run at a time).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationStatus {
    pub running: bool,
    pub completed_runs: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fire-once summary recomputation after a fixed delay. Not cancellable.
#[derive(Clone)]
pub struct Recalculation {
    busy: BusyFlag,
    delay: Duration,
    status: Arc<RwLock<RecalculationStatus>>,
    summary: Arc<RwLock<Option<DashboardSummary>>>,
}

impl Recalculation {
    pub fn new(delay: Duration) -> Self {
        Self {
            busy: BusyFlag::new(),
            delay,
            status: Arc::new(RwLock::new(RecalculationStatus::default())),
            summary: Arc::new(RwLock::new(None)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.busy.is_busy()
    }

    /// `running` mirrors the busy flag, so it is true from the moment a run
    /// is accepted.
    pub async fn status(&self) -> RecalculationStatus {
        let mut status = self.status.read().await.clone();
        status.running = self.busy.is_busy();
        status
    }

    /// Result of the last completed run.
    pub async fn summary(&self) -> Option<DashboardSummary> {
        self.summary.read().await.clone()
    }

    /// Compute the initial summary immediately, without the delay.
    pub async fn prime(&self, store: &DatasetStore) {
        let summary = DashboardSummary::compute(&store.snapshot().await);
        *self.summary.write().await = Some(summary);
    }

    /// Start a run in the background.
    pub fn start(&self, store: DatasetStore) -> Result<(), RecalculationError> {
        let guard = self.busy.try_acquire().ok_or(RecalculationError::Busy)?;
        let job = self.clone();
        tokio::spawn(async move {
            job.execute(&store).await;
            drop(guard);
        });
        Ok(())
    }

    /// Run to completion on the current task.
    pub async fn run(&self, store: &DatasetStore) -> Result<DashboardSummary, RecalculationError> {
        let _guard = self.busy.try_acquire().ok_or(RecalculationError::Busy)?;
        Ok(self.execute(store).await)
    }

    async fn execute(&self, store: &DatasetStore) -> DashboardSummary {
        self.status.write().await.started_at = Some(Utc::now());
        tracing::info!("Recalculating dashboard summary");

        tokio::time::sleep(self.delay).await;
        let summary = DashboardSummary::compute(&store.snapshot().await);
        *self.summary.write().await = Some(summary.clone());

        let mut status = self.status.write().await;
        status.completed_runs += 1;
        status.completed_at = Some(summary.computed_at);
        tracing::info!(
            "Recalculation finished ({} services)",
            summary.total_services
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Risk};
    use crate::repository::ServiceDataset;

    fn services() -> Vec<Service> {
        let mut a = Service::new("CI1", "A", Category::Critical, Risk::High);
        a.incomplete_plan = true;
        a.invalid_selection = true;
        a.ras_score = Some(Score::Extreme);
        a.residual_score = Some(Score::Medium);
        let mut b = Service::new("CI2", "B", Category::SaaS, Risk::Low);
        b.incomplete_plan = true;
        b.ras_score = Some(Score::Extreme);
        let c = Service::new("CI3", "C", Category::Critical, Risk::Low);
        vec![a, b, c]
    }

    #[test]
    fn test_kpi_counts_and_links() {
        let summary = KpiSummary::from_services(&services());
        assert_eq!(summary.incomplete_plan, 2);
        assert_eq!(summary.remediation_expired, 0);
        assert_eq!(summary.invalid_selection, 1);

        let kpis = summary.kpis();
        assert_eq!(kpis[0].link, "/aop?incompletePlan=true");
        assert_eq!(kpis[2].key, "invalidSelection");
    }

    #[test]
    fn test_heat_map_is_zero_filled_in_severity_order() {
        let map = HeatMap::for_score(&services(), ScoreKind::RasScore);
        assert_eq!(map.cells.len(), 7);
        assert_eq!(map.cells[0].score, Score::Extreme);
        assert_eq!(map.cells[0].count, 2);
        assert_eq!(map.cells[6].score, Score::SaasCompliant);
        assert_eq!(map.cells[6].count, 0);
        assert_eq!(map.total(), 2);
    }

    #[tokio::test]
    async fn test_recalculation_rejects_overlap() {
        let store = DatasetStore::new(ServiceDataset::from_services(services()).unwrap());
        let job = Recalculation::new(Duration::from_millis(50));

        job.start(store.clone()).unwrap();
        assert!(job.is_running());
        assert!(job.status().await.running);
        assert!(matches!(job.start(store.clone()), Err(RecalculationError::Busy)));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!job.is_running());
        let status = job.status().await;
        assert!(!status.running);
        assert_eq!(status.completed_runs, 1);
        assert_eq!(job.summary().await.unwrap().kpis.incomplete_plan, 2);
    }

    #[tokio::test]
    async fn test_run_inline() {
        let store = DatasetStore::new(ServiceDataset::from_services(services()).unwrap());
        let job = Recalculation::new(Duration::ZERO);
        let summary = job.run(&store).await.unwrap();
        assert_eq!(summary.total_services, 3);
        assert_eq!(summary.residual_heat_map.total(), 1);
    }
}
