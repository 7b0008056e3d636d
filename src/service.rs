//! Gateway service: the two caller-facing operations plus health
//!
//! Owns the wiring between registry, cache, normalizer and aggregator so the
//! HTTP routes and the CLI share one entry point.

use linked_art_types::{CandidateResponse, CandidatesResponse, HealthResponse};
use std::sync::Arc;

use crate::config::{GatewayConfig, ResolutionConfig};
use crate::error::{ConfigError, ResolveError};
use crate::resolve::{RecordNormalizer, ReferenceCache, SingleFlightCache};
use crate::search::SearchAggregator;
use crate::sources::{build_registry, SourceRegistry};

pub struct GatewayService {
    registry: Arc<SourceRegistry>,
    cache: Arc<dyn ReferenceCache>,
    normalizer: Arc<RecordNormalizer>,
    aggregator: SearchAggregator,
}

impl GatewayService {
    pub fn new(
        registry: Arc<SourceRegistry>,
        cache: Arc<dyn ReferenceCache>,
        settings: ResolutionConfig,
    ) -> Self {
        let normalizer = Arc::new(RecordNormalizer::new(
            registry.clone(),
            cache.clone(),
            settings.clone(),
        ));
        let aggregator = SearchAggregator::new(normalizer.clone(), settings);
        Self {
            registry,
            cache,
            normalizer,
            aggregator,
        }
    }

    /// Wire HTTP adapters for every configured dataset
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let registry = Arc::new(build_registry(config)?);
        let cache: Arc<dyn ReferenceCache> =
            Arc::new(SingleFlightCache::from_config(&config.cache));
        tracing::info!(
            datasets = registry.len(),
            capacity = config.cache.capacity,
            "Gateway service ready"
        );
        Ok(Self::new(registry, cache, config.resolution.clone()))
    }

    pub fn normalizer(&self) -> &Arc<RecordNormalizer> {
        &self.normalizer
    }

    /// Search a comma-separated list of datasets by name
    pub async fn search_by_name(
        &self,
        datasets: &str,
        entity_name: &str,
        lang: &str,
        entity_type: &str,
    ) -> CandidatesResponse {
        let datasets = split_datasets(datasets);
        let candidates = self
            .aggregator
            .search_by_name(&datasets, entity_name, lang, entity_type)
            .await;
        tracing::info!(
            ?datasets,
            entity_name,
            candidates = candidates.len(),
            "search_by_name"
        );
        CandidatesResponse { candidates }
    }

    /// Resolve one identifier.
    ///
    /// An unknown dataset is an error; any other failure yields a null candidate.
    pub async fn get_by_id(
        &self,
        dataset: &str,
        identifier: &str,
        entity_type: &str,
    ) -> Result<CandidateResponse, ResolveError> {
        self.registry.resolve(dataset)?;
        match self
            .normalizer
            .resolve_record(dataset, identifier, entity_type)
            .await
        {
            Ok(record) => Ok(CandidateResponse {
                candidate: Some(record),
            }),
            Err(ResolveError::UnknownDataset(name)) => Err(ResolveError::UnknownDataset(name)),
            Err(error) => {
                tracing::info!(%dataset, %identifier, %error, "No candidate");
                Ok(CandidateResponse::default())
            }
        }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            datasets: self.registry.datasets().into_iter().map(String::from).collect(),
            cache_entries: self.cache.len(),
        }
    }
}

fn split_datasets(datasets: &str) -> Vec<String> {
    datasets
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
