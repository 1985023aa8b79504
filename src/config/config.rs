use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const API_URL_ENV: &str = "SUSTAIN_API_URL";
pub const DATASET_ENV: &str = "SUSTAIN_DATASET";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub dataset: DatasetConfig,
    pub training: TrainingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Server root, e.g. "http://localhost:5000"
    pub base_url: String,

    pub train_path: String,
    pub batch_analyze_path: String,

    /// Single-shipment analysis, used with --single
    pub analyze_path: String,

    /// Training readiness endpoint. Polling is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_path: Option<String>,

    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Unconditional wait after the training call
    pub delay_secs: f64,

    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per level when printing response JSON
    pub indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            dataset: DatasetConfig::default(),
            training: TrainingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            train_path: "/api/v1/sustainability/train".to_string(),
            batch_analyze_path: "/api/v1/sustainability/batch-analyze".to_string(),
            analyze_path: "/api/v1/sustainability/analyze".to_string(),
            status_path: None,
            timeout_secs: None,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("synthetic_data_1.json"),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            delay_secs: 5.0,
            poll_interval_ms: 1000,
            max_polls: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { indent: 1 }
    }
}

impl TrainingConfig {
    /// `delay_secs` as a `Duration`. Rejects negative, NaN and values too
    /// large to represent.
    pub fn delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.delay_secs).map_err(|_| {
            anyhow::anyhow!(
                "training.delay_secs must be non-negative and in range, got {}",
                self.delay_secs
            )
        })
    }
}

impl Config {
    /// Load config from `path`, or from the default location when `path` is
    /// `None`. An explicit path must exist; a missing default file yields the
    /// built-in defaults and nothing is written.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::get_config_path()?, false),
        };

        if !config_path.exists() {
            if required {
                anyhow::bail!("config file not found: {}", config_path.display());
            }
            debug!(target: "config", "No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let config = Self::load_from(&config_path)?;
        info!(target: "config", "Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        self.training.delay()?;
        Ok(())
    }

    /// Apply `SUSTAIN_API_URL` and `SUSTAIN_DATASET` from the process
    /// environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(target: "config", "{} overrides base_url: {}", API_URL_ENV, url);
            self.api.base_url = url;
        }
        if let Some(path) = lookup(DATASET_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(target: "config", "{} overrides dataset path: {}", DATASET_ENV, path);
            self.dataset.path = PathBuf::from(path);
        }
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("sustain-cli").join("config.toml"))
    }

    /// Write the commented default config to `path`, creating parent
    /// directories as needed.
    pub fn write_default_with_comments(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, Self::create_default_with_comments())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# sustain-cli configuration
# Location: ~/.config/sustain-cli/config.toml (Linux)
#           ~/Library/Application Support/sustain-cli/config.toml (macOS)
#           %APPDATA%\sustain-cli\config.toml (Windows)
#
# SUSTAIN_API_URL and SUSTAIN_DATASET override the values below,
# and command-line flags override both.

[api]
# Root of the sustainability service
base_url = "http://localhost:5000"

train_path = "/api/v1/sustainability/train"
batch_analyze_path = "/api/v1/sustainability/batch-analyze"

# Used only with --single
analyze_path = "/api/v1/sustainability/analyze"

# If the service reports training progress, point this at it and the
# driver will poll it after the fixed delay until training is ready.
# status_path = "/api/v1/sustainability/status"

# Per-request timeout in seconds (requests wait indefinitely when unset)
# timeout_secs = 60

[dataset]
# JSON file with data.shipments and data.sustainability_scores
path = "synthetic_data_1.json"

[training]
# Seconds to wait after the training call before analysing
delay_secs = 5.0

# Readiness polling (only when api.status_path is set)
poll_interval_ms = 1000
max_polls = 30

[output]
# Spaces per indentation level when printing the response JSON
indent = 1
"#
        .to_string()
    }
}
