//! Configuration management commands.

use console::style;

use crate::cli::icons::arrow;
use crate::config::{Config, Settings};

/// Print resolved settings and the file that supplied them.
pub fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());

    println!("{}", style("Configuration").bold());
    println!("  {} Source: {}", arrow(), source);
    println!("  {} Dataset: {}", arrow(), settings.dataset.display());
    println!("  {} Bind: {}", arrow(), settings.bind);
    println!("  {} Persist edits: {}", arrow(), settings.persist_edits);
    println!(
        "  {} Recalculate delay: {}ms",
        arrow(),
        settings.recalculate_delay.as_millis()
    );
    let columns: Vec<&str> = settings
        .default_columns
        .fields()
        .iter()
        .map(|f| f.key())
        .collect();
    println!("  {} Default columns: {}", arrow(), columns.join(", "));

    if config.source_path.is_some() {
        println!();
        println!("{}", style("File contents (TOML)").bold());
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}
