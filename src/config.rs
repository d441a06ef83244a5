//! Configuration management for hirefinder
//!
//! All configuration is loaded from `./config/hirefinder.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the config template.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/hirefinder.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/hirefinder.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub classification: ClassificationConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

/// HTTP client configuration shared by all outbound calls
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

/// Language-model classification service endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Web search provider endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub result_cap: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Pipeline bounds and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub description_prefix_chars: usize,
    pub search_keyword_top_k: usize,
    pub verify_top_n: usize,
    pub verification_queries_per_candidate: usize,
    pub candidate_cap: usize,
    #[serde(default)]
    pub inter_posting_delay_ms: u64,
}

/// Trigger word lists for the manufacturing gate and hard filters.
///
/// These are configuration rather than code: the boundary between
/// "industrial services" and "industrial manufacturing" is heuristic and
/// deployments tune it.
#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    #[serde(default = "default_manufacturing_triggers")]
    pub manufacturing_triggers: Vec<String>,
    #[serde(default = "default_physical_production_terms")]
    pub physical_production_terms: Vec<String>,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_manufacturing_triggers() -> Vec<String> {
    ["manufactur", "fabricat", "production", "cnc", "machining", "sheet metal"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_physical_production_terms() -> Vec<String> {
    [
        "factory",
        "shop floor",
        "fabrication",
        "cnc",
        "press brake",
        "laser cutting",
        "moulding",
        "assembly",
        "sheet metal",
        "welding",
        "plant",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            manufacturing_triggers: default_manufacturing_triggers(),
            physical_production_terms: default_physical_production_terms(),
        }
    }
}

impl FiltersConfig {
    /// True when an industry label lexically indicates manufacturing,
    /// fabrication or production per the configured trigger set.
    pub fn is_manufacturing_like(&self, industry_label: &str) -> bool {
        let label = industry_label.to_lowercase();
        self.manufacturing_triggers
            .iter()
            .any(|trigger| label.contains(&trigger.to_lowercase()))
    }

    /// True when a snippet contains at least one physical-production term.
    pub fn has_physical_production_term(&self, snippet: &str) -> bool {
        let snippet = snippet.to_lowercase();
        self.physical_production_terms
            .iter()
            .any(|term| snippet.contains(&term.to_lowercase()))
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate the embedded default configuration
    pub fn default_config() -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }

        for (field, url) in [
            ("classification.base_url", &self.classification.base_url),
            ("search.base_url", &self.search.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: url.clone(),
                });
            }
        }

        if self.classification.model.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "classification.model".to_string(),
            });
        }
        if self.classification.api_key_env.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "classification.api_key_env".to_string(),
            });
        }
        if self.classification.max_attempts == 0 || self.search.max_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.search.result_cap == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "search.result_cap".to_string(),
            });
        }

        if self.pipeline.candidate_cap == 0 || self.pipeline.candidate_cap > 5 {
            return Err(ConfigError::OutOfRange {
                field: "pipeline.candidate_cap".to_string(),
                reason: "must be between 1 and 5".to_string(),
            });
        }
        if self.pipeline.verify_top_n == 0 {
            return Err(ConfigError::OutOfRange {
                field: "pipeline.verify_top_n".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.pipeline.description_prefix_chars == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "pipeline.description_prefix_chars".to_string(),
            });
        }

        if self.filters.physical_production_terms.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "filters.physical_production_terms".to_string(),
            });
        }

        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG)?;

        Ok(path.to_path_buf())
    }
}
