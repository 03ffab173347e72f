//! Configuration management using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::ServiceField;
use crate::pipeline::ColumnVisibility;

/// Name used for config auto-discovery (`eos-aop.toml`, `eos-aop.yaml`, ...).
pub const CONFIG_NAME: &str = "eos-aop";

/// Default dataset location, relative to the config base directory.
pub const DEFAULT_DATASET: &str = "data/services.json";

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// Default simulated delay for dashboard recalculation.
pub const DEFAULT_RECALCULATE_DELAY_MS: u64 = 2000;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Service dataset JSON file.
    pub dataset: PathBuf,
    /// Server bind address (PORT, HOST, or HOST:PORT).
    pub bind: String,
    /// Write edits back to the dataset file.
    pub persist_edits: bool,
    /// Simulated recalculation delay.
    pub recalculate_delay: Duration,
    /// Columns shown when the AOP page opens.
    pub default_columns: ColumnVisibility,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            bind: DEFAULT_BIND.to_string(),
            persist_edits: false,
            recalculate_delay: Duration::from_millis(DEFAULT_RECALCULATE_DELAY_MS),
            default_columns: ColumnVisibility::default(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Dataset path (relative paths resolve against the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Server bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Write edits back to the dataset file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_edits: Option<bool>,
    /// Recalculation delay in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recalculate_delay_ms: Option<u64>,
    /// Column keys visible by default (e.g. `["id", "name", "risk"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub default_columns: Vec<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer for discovery.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Format is chosen by extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are joined onto `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Visible columns named by `default_columns`; unknown keys are skipped.
    pub fn columns(&self) -> ColumnVisibility {
        let fields = self.default_columns.iter().filter_map(|key| {
            let field = ServiceField::from_key(key);
            if field.is_none() {
                tracing::warn!("Ignoring unknown column in config: {}", key);
            }
            field
        });
        ColumnVisibility::from_fields(fields)
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref dataset) = self.dataset {
            settings.dataset = self.resolve_path(dataset, base_dir);
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(persist) = self.persist_edits {
            settings.persist_edits = persist;
        }
        if let Some(delay) = self.recalculate_delay_ms {
            settings.recalculate_delay = Duration::from_millis(delay);
        }
        if !self.default_columns.is_empty() {
            settings.default_columns = self.columns();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Resolve relative paths from CWD instead of the config file location.
    pub use_cwd: bool,
    /// Dataset file (--dataset flag), highest precedence.
    pub dataset: Option<PathBuf>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Load settings with explicit options.
///
/// Precedence, lowest first: defaults, config file, environment
/// (`EOS_DATASET`, `EOS_BIND`), command-line flags.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let base_dir = if options.use_cwd {
        current_dir()
    } else {
        config.base_dir().unwrap_or_else(current_dir)
    };

    let mut settings = Settings::default();
    settings.dataset = base_dir.join(DEFAULT_DATASET);
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(dataset) = env_var("EOS_DATASET") {
        tracing::debug!("Using EOS_DATASET from environment: {}", dataset);
        settings.dataset = config.resolve_path(&dataset, &current_dir());
    }
    if let Some(bind) = env_var("EOS_BIND") {
        tracing::debug!("Using EOS_BIND from environment: {}", bind);
        settings.bind = bind;
    }

    if let Some(dataset) = options.dataset {
        settings.dataset = if dataset.is_absolute() {
            dataset
        } else {
            current_dir().join(dataset)
        };
    }

    (settings, config)
}
