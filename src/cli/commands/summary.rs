//! Dashboard summary command.

use console::style;

use super::helpers::load_dataset;
use crate::config::Settings;
use crate::dashboard::{DashboardSummary, HeatMap};

pub async fn cmd_summary(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let dataset = load_dataset(settings).await?;
    let summary = DashboardSummary::compute(dataset.services());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} ({} services)",
        style("EoS AOP Record Issues").bold(),
        summary.total_services
    );
    for kpi in summary.kpis.kpis() {
        let count = if kpi.count > 0 {
            style(kpi.count).yellow()
        } else {
            style(kpi.count).green()
        };
        println!("  {:<22} {}", kpi.title, count);
    }

    print_heat_map(&summary.ras_heat_map);
    print_heat_map(&summary.residual_heat_map);
    Ok(())
}

fn print_heat_map(map: &HeatMap) {
    println!();
    println!("{}", style(map.title()).bold());
    for cell in &map.cells {
        println!("  {:<16} {:>5}", cell.label(), cell.count);
    }
    println!("  {:<16} {:>5}", style("Total").dim(), map.total());
}
