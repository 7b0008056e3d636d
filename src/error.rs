//! Error types for the gateway
//!
//! `ResolveError` is the outcome of resolving one identifier. It is `Clone`
//! because outcomes (failures included) are memoized and shared between
//! concurrent callers. `SourceError` is what dataset collaborators report;
//! the normalizer folds it into a `ResolveError`.

use thiserror::Error;

/// Why an identifier could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("Record '{identifier}' not found in '{dataset}'")]
    NotFound { dataset: String, identifier: String },

    #[error("Record '{identifier}' from '{dataset}' could not be mapped: {reason}")]
    MappingFailed {
        dataset: String,
        identifier: String,
        reason: String,
    },

    #[error("Record '{identifier}' from '{dataset}' has no usable name")]
    NoPrimaryName { dataset: String, identifier: String },

    #[error("Timed out after {timeout_ms}ms on {operation} '{identifier}' in '{dataset}'")]
    Timeout {
        dataset: String,
        identifier: String,
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Reference cycle through '{identifier}' in '{dataset}'")]
    Cycle { dataset: String, identifier: String },

    #[error("Transport error from '{dataset}' for '{identifier}': {message}")]
    Transport {
        dataset: String,
        identifier: String,
        message: String,
    },
}

impl ResolveError {
    /// Failures that depend on the network rather than on the record itself.
    ///
    /// These are handed to in-flight waiters but never retained by the cache.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }
}

/// Errors raised by fetchers, mappers and searchers
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Unmappable record: {0}")]
    Unmappable(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        SourceError::Decode(error.to_string())
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(error: quick_xml::Error) -> Self {
        SourceError::Decode(error.to_string())
    }
}

/// Errors raised while building a source registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Dataset '{0}' is registered twice")]
    Duplicate(String),
}

/// Configuration and bootstrap errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Dataset '{0}' is registered twice")]
    DuplicateDataset(String),

    #[error("Dataset '{dataset}': {message}")]
    InvalidDataset { dataset: String, message: String },

    #[error("Failed to initialise dataset adapter: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
