//! Web interface for the EoS service inventory.
//!
//! - Dashboard with record-issue KPIs and score heat maps
//! - Annual Operating Plan table with two-stage filtering, sorting,
//!   selection, column chooser, CSV export and bulk update
//! - Single service edit page
//! - JSON API over the same operations

mod assets;
mod handlers;
mod page_query;
mod routes;
mod template_structs;

pub use routes::create_router;

use std::net::SocketAddr;

use crate::config::Settings;
use crate::dashboard::Recalculation;
use crate::pipeline::ColumnVisibility;
use crate::repository::{DatasetStore, ServiceDataset};
use crate::utils::BusyFlag;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub store: DatasetStore,
    /// Held while a bulk update is in flight (only one at a time).
    pub bulk_busy: BusyFlag,
    pub recalculation: Recalculation,
    pub default_columns: ColumnVisibility,
}

impl AppState {
    pub async fn new(settings: &Settings, dataset: ServiceDataset) -> Self {
        let mut store = DatasetStore::new(dataset);
        if settings.persist_edits {
            store = store.with_persistence(settings.dataset.clone());
        }

        let recalculation = Recalculation::new(settings.recalculate_delay);
        recalculation.prime(&store).await;

        Self {
            store,
            bulk_busy: BusyFlag::new(),
            recalculation,
            default_columns: settings.default_columns.clone(),
        }
    }
}

/// Start the web server.
pub async fn serve(
    settings: &Settings,
    dataset: ServiceDataset,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let state = AppState::new(settings, dataset).await;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
