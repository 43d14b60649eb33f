use crate::output::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Viewer configuration, usually loaded from a TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the results API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Local directory of result files; used instead of the API when set
    #[serde(default)]
    pub results_dir: Option<PathBuf>,
    /// Request timeout for the results API
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Models shown in the overview coverage grid
    #[serde(default = "default_coverage_columns")]
    pub coverage_columns: usize,
    /// Default output format
    #[serde(default)]
    pub output: OutputFormat,
}

fn default_api_base_url() -> String {
    "http://localhost:8001/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_coverage_columns() -> usize {
    6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            results_dir: None,
            timeout_secs: default_timeout_secs(),
            coverage_columns: default_coverage_columns(),
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Load `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
