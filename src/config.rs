//! Gateway configuration
//!
//! Loaded from YAML (`config/datasets.yaml` by default). Every section has
//! serde defaults, so a file listing only `datasets` is complete.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Root configuration structure for the gateway
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:5002".to_string()
}

/// Reference cache sizing
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of resolved identifiers kept
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    /// Optional time-to-live; entries live for the process when absent
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: None,
        }
    }
}

fn default_cache_capacity() -> u64 {
    10_000
}

/// Limits applied while resolving and searching
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub search_timeout_ms: u64,
    /// Identifiers kept per dataset from a name search
    #[serde(default = "default_max_search_hits")]
    pub max_search_hits: usize,
    #[serde(default = "default_max_descriptions")]
    pub max_descriptions: usize,
    /// How deep `carries`/`shows` records may embed each other
    #[serde(default = "default_max_embed_depth")]
    pub max_embed_depth: usize,
    /// Keep only descriptions in this language (code or language URI)
    #[serde(default)]
    pub description_language: Option<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_timeout_ms(),
            search_timeout_ms: default_timeout_ms(),
            max_search_hits: default_max_search_hits(),
            max_descriptions: default_max_descriptions(),
            max_embed_depth: default_max_embed_depth(),
            description_language: None,
        }
    }
}

impl ResolutionConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_search_hits() -> usize {
    10
}

fn default_max_descriptions() -> usize {
    5
}

fn default_max_embed_depth() -> usize {
    4
}

/// Which adapter set serves a dataset
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Serves Linked Art already; no searcher
    LinkedArt,
    Wikidata,
    Getty,
    Lux,
    Pleiades,
    Met,
}

/// One external dataset
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub kind: AdapterKind,
    /// URI prefix stripped to obtain local identifiers
    pub namespace: String,
    /// Alternate URI fragments that also denote this dataset's identifiers
    #[serde(default)]
    pub matches: Vec<String>,
    /// Fetch URL template containing `{identifier}`
    pub fetch: String,
    /// Search endpoint override; each adapter has a built-in default
    #[serde(default)]
    pub search: Option<String>,
    /// Minimum delay between two requests to this dataset
    #[serde(default)]
    pub rate_limit_ms: u64,
}

impl GatewayConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, dataset) in self.datasets.iter().enumerate() {
            if self.datasets[..i].iter().any(|d| d.name == dataset.name) {
                return Err(ConfigError::DuplicateDataset(dataset.name.clone()));
            }
            if !dataset.fetch.contains("{identifier}") {
                return Err(ConfigError::InvalidDataset {
                    dataset: dataset.name.clone(),
                    message: "fetch template has no {identifier} placeholder".to_string(),
                });
            }
        }
        Ok(())
    }
}
