//! In-memory collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use linked_art_gateway::config::ResolutionConfig;
use linked_art_gateway::resolve::{ReferenceCache, SingleFlightCache};
use linked_art_gateway::sources::{LinkedArtMapper, SourceDescriptor};
use linked_art_gateway::{
    Fetcher, GatewayService, RawRecord, RecordNormalizer, SearchRequest, Searcher, SourceError,
    SourceRegistry,
};
use linked_art_types::PRIMARY_NAME;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serves Linked Art JSON from a map keyed by local identifier
#[derive(Default)]
pub struct MemoryFetcher {
    name: String,
    records: HashMap<String, Value>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with(mut self, local: &str, record: Value) -> Self {
        self.records.insert(local.to_string(), record);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, identifier: &str) -> Result<Option<RawRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .records
            .get(identifier)
            .map(|data| RawRecord::new(data.clone(), identifier, &self.name)))
    }
}

/// Returns a fixed hit list, recording the last query it saw
#[derive(Default)]
pub struct FixedSearcher {
    hits: Vec<String>,
    last_query: std::sync::Mutex<Option<String>>,
}

impl FixedSearcher {
    pub fn new(hits: Vec<String>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl Searcher for FixedSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        *self.last_query.lock().unwrap() = Some(request.query.clone());
        Ok(self.hits.clone())
    }
}

pub struct FailingSearcher;

#[async_trait]
impl Searcher for FailingSearcher {
    async fn search(&self, _request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Status {
            status: 503,
            url: "http://search.invalid/".to_string(),
        })
    }
}

// =============================================================================
// Record builders
// =============================================================================

pub fn named(record_type: &str, name: &str) -> Value {
    json!({
        "type": record_type,
        "identified_by": [{
            "type": "Name",
            "content": name,
            "classified_as": [{"id": PRIMARY_NAME}]
        }]
    })
}

/// Merge `extra` into a named record
pub fn record(record_type: &str, name: &str, extra: Value) -> Value {
    let mut base = named(record_type, name);
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

pub fn refs(ids: &[&str]) -> Value {
    Value::Array(ids.iter().map(|id| json!({ "id": id })).collect())
}

// =============================================================================
// Wiring
// =============================================================================

pub struct Dataset {
    pub descriptor: SourceDescriptor,
    pub fetcher: Arc<MemoryFetcher>,
    pub searcher: Option<Arc<dyn Searcher>>,
}

impl Dataset {
    pub fn new(name: &str, namespace: &str, fetcher: MemoryFetcher) -> Self {
        Self {
            descriptor: SourceDescriptor::new(
                name,
                namespace,
                format!("{}{{identifier}}", namespace),
            ),
            fetcher: Arc::new(fetcher),
            searcher: None,
        }
    }

    pub fn searchable(mut self, searcher: Arc<dyn Searcher>) -> Self {
        self.searcher = Some(searcher);
        self
    }
}

pub fn registry(datasets: &[&Dataset]) -> Arc<SourceRegistry> {
    let mut builder = SourceRegistry::builder();
    for dataset in datasets {
        builder = builder
            .register(
                dataset.descriptor.clone(),
                dataset.fetcher.clone(),
                Arc::new(LinkedArtMapper),
                dataset.searcher.clone(),
            )
            .unwrap();
    }
    Arc::new(builder.build())
}

pub fn settings() -> ResolutionConfig {
    ResolutionConfig::default()
}

pub fn normalizer(datasets: &[&Dataset], settings: ResolutionConfig) -> RecordNormalizer {
    let cache: Arc<dyn ReferenceCache> = Arc::new(SingleFlightCache::new(1_000));
    RecordNormalizer::new(registry(datasets), cache, settings)
}

pub fn service(datasets: &[&Dataset], settings: ResolutionConfig) -> GatewayService {
    let cache: Arc<dyn ReferenceCache> = Arc::new(SingleFlightCache::new(1_000));
    GatewayService::new(registry(datasets), cache, settings)
}
