//! Collaborator traits for dataset adapters
//!
//! Every dataset plugs into the gateway through three seams: a `Fetcher` that
//! retrieves a raw payload, a `Mapper` that turns it into a canonical record,
//! and an optional `Searcher` that finds identifiers by name.

use async_trait::async_trait;
use linked_art_types::CanonicalRecord;
use serde_json::Value;

use crate::error::SourceError;

/// A payload as returned by a dataset, with its provenance
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub data: Value,
    /// Local identifier the payload was fetched for
    pub identifier: String,
    /// Dataset name
    pub source: String,
}

impl RawRecord {
    pub fn new(data: Value, identifier: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            data,
            identifier: identifier.into(),
            source: source.into(),
        }
    }
}

// =============================================================================
// Argument Structs
// =============================================================================

/// A name query against one dataset
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Lower-cased free-text name
    pub query: String,
    /// Language code of the name ("en", "fr", ...)
    pub lang: String,
    /// Entity-type hint ("Person", "Place", ...); empty when unknown
    pub entity_type: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            lang: "en".to_string(),
            entity_type: String::new(),
        }
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Retrieves raw payloads by local identifier
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the payload for `identifier`.
    ///
    /// `Ok(None)` means the dataset does not know the identifier.
    async fn fetch(&self, identifier: &str) -> Result<Option<RawRecord>, SourceError>;
}

/// Converts a raw payload into the canonical record shape
pub trait Mapper: Send + Sync {
    /// `entity_type` is an advisory hint and may be empty.
    fn transform(&self, raw: &RawRecord, entity_type: &str)
        -> Result<CanonicalRecord, SourceError>;
}

/// Finds candidate identifiers by name
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Returns identifiers in relevance order, absolute or local.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError>;
}
