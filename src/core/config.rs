//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::sample::{
    AnalysisOptions, FailureBasis, SpreadConvention, DEFAULT_SAMPLE_SIZE,
};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "rqc.yaml";

/// Suppliers offered when none are configured
pub const DEFAULT_SUPPLIERS: [&str; 4] = ["Farnell", "RSComponents", "Rapid Electronics", "DigiKey"];

/// Errors raised by configuration values
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to parse {}: {message}", path.display())]
    #[diagnostic(code(rqc::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("sample_size must be at least 1, got {0}")]
    #[diagnostic(code(rqc::config::sample_size))]
    InvalidSampleSize(usize),

    #[error("{name} is set to {value:?}, which is not a whole number")]
    #[diagnostic(code(rqc::config::env))]
    InvalidEnv { name: &'static str, value: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(rqc::config::io))]
    Io(#[from] std::io::Error),
}

/// RQC configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the batch logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Supplier menu entries, in menu order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppliers: Option<Vec<String>>,

    /// Units measured per batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,

    /// Variance convention
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<SpreadConvention>,

    /// Failure rate scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_basis: Option<FailureBasis>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/rqc/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // 2. Local config (./rqc.yaml)
        config.merge_file(&Self::local_config_path());

        // 3. Environment variables
        if let Ok(dir) = std::env::var("RQC_LOG_DIR") {
            if !dir.trim().is_empty() {
                config.log_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(raw) = std::env::var("RQC_SAMPLE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.sample_size = Some(n),
                Err(_) => warn!(
                    "{}",
                    ConfigError::InvalidEnv {
                        name: "RQC_SAMPLE_SIZE",
                        value: raw
                    }
                ),
            }
        }

        config
    }

    /// Parse one configuration layer
    pub fn from_yaml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Merge a config file if present, skipping it with a warning on failure
    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }

        let layer = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|contents| Self::from_yaml_str(&contents, path));

        match layer {
            Ok(layer) => {
                debug!(path = %path.display(), "loaded config layer");
                self.merge(layer);
            }
            Err(e) => warn!(path = %path.display(), "skipping config layer: {}", e),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rqc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Get the path to the local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(LOCAL_CONFIG_FILE)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.log_dir.is_some() {
            self.log_dir = other.log_dir;
        }
        if other.suppliers.is_some() {
            self.suppliers = other.suppliers;
        }
        if other.sample_size.is_some() {
            self.sample_size = other.sample_size;
        }
        if other.spread.is_some() {
            self.spread = other.spread;
        }
        if other.failure_basis.is_some() {
            self.failure_basis = other.failure_basis;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Directory holding the batch logs, the current directory by default
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Supplier menu entries
    ///
    /// Entries are trimmed. Blank entries and entries holding control
    /// characters are dropped; if none remain the defaults are used.
    pub fn suppliers(&self) -> Vec<String> {
        let configured: Vec<String> = self
            .suppliers
            .iter()
            .flatten()
            .filter_map(|entry| {
                let name = entry.trim();
                if name.is_empty() || name.chars().any(char::is_control) {
                    warn!(entry = ?entry, "ignoring unusable supplier entry");
                    None
                } else {
                    Some(name.to_string())
                }
            })
            .collect();

        if configured.is_empty() {
            DEFAULT_SUPPLIERS.iter().map(|s| s.to_string()).collect()
        } else {
            configured
        }
    }

    /// Evaluation options, validated
    pub fn analysis_options(&self) -> Result<AnalysisOptions, ConfigError> {
        let sample_size = self.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE);
        if sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize(sample_size));
        }

        Ok(AnalysisOptions {
            sample_size,
            spread: self.spread.unwrap_or_default(),
            failure_basis: self.failure_basis.unwrap_or_default(),
        })
    }
}
