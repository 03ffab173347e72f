//! `eos` argument parser and subcommand dispatch.

mod config_cmd;
mod export;
mod helpers;
mod serve;
mod summary;
mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "eos")]
#[command(about = "End of Support software risk tracking")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service dataset JSON file (overrides config and EOS_DATASET)
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web dashboard
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: from config, else 127.0.0.1:3030)
        bind: Option<String>,
    },

    /// Export services as CSV after applying filters
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Coarse filter FIELD=VALUE[,VALUE...] (repeatable, e.g. category=Critical,SaaS)
        #[arg(short, long = "filter", value_name = "FIELD=VALUES")]
        filters: Vec<String>,
        /// Substring filter FIELD=PATTERN (repeatable, case-insensitive)
        #[arg(short, long = "search", value_name = "FIELD=PATTERN")]
        searches: Vec<String>,
        /// Sort column key (e.g. rasScore)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Show KPI counters and score distributions
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a DD/MM/YYYY date
    ValidateDate {
        /// Date to check
        value: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved settings and the config file they came from
    Show,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        dataset: cli.dataset,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Export {
            output,
            filters,
            searches,
            sort,
            desc,
        } => {
            let request = export::ExportRequest::parse(&filters, &searches, sort.as_deref(), desc)?;
            export::cmd_export(&settings, &request, output.as_deref()).await
        }
        Commands::Summary { json } => summary::cmd_summary(&settings, json).await,
        Commands::ValidateDate { value } => validate::cmd_validate_date(&value),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, &config),
        },
    }
}
