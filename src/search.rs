//! Multi-dataset search aggregator
//!
//! Fans a name query out to each requested dataset's searcher, truncates the
//! hits, and normalizes every hit through the record normalizer. Results are
//! concatenated in the caller's dataset order.

use futures::future::join_all;
use linked_art_types::SimplifiedRecord;
use std::sync::Arc;

use crate::config::ResolutionConfig;
use crate::resolve::RecordNormalizer;
use crate::sources::SearchRequest;

pub struct SearchAggregator {
    normalizer: Arc<RecordNormalizer>,
    settings: ResolutionConfig,
}

impl SearchAggregator {
    pub fn new(normalizer: Arc<RecordNormalizer>, settings: ResolutionConfig) -> Self {
        Self {
            normalizer,
            settings,
        }
    }

    /// Search `datasets` for `name` and return the normalized hits.
    ///
    /// Unknown datasets and datasets without a searcher contribute nothing.
    /// A failing or slow searcher contributes nothing either; the other
    /// datasets are unaffected.
    pub async fn search_by_name(
        &self,
        datasets: &[String],
        name: &str,
        lang: &str,
        entity_type: &str,
    ) -> Vec<SimplifiedRecord> {
        let request = SearchRequest::new(name.trim().to_lowercase())
            .with_language(lang)
            .with_entity_type(entity_type);

        let per_dataset = join_all(
            datasets
                .iter()
                .map(|dataset| self.search_dataset(dataset, &request)),
        )
        .await;

        per_dataset.into_iter().flatten().collect()
    }

    async fn search_dataset(
        &self,
        dataset: &str,
        request: &SearchRequest,
    ) -> Vec<SimplifiedRecord> {
        let ids = self.identifiers(dataset, request).await;
        let records = join_all(ids.iter().map(|id| {
            self.normalizer
                .resolve_record(dataset, id, &request.entity_type)
        }))
        .await;

        ids.iter()
            .zip(records)
            .filter_map(|(id, record)| match record {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::debug!(%dataset, identifier = %id, %error, "Dropping search hit");
                    None
                }
            })
            .collect()
    }

    /// Local identifiers of the first hits, at most `max_search_hits`
    async fn identifiers(&self, dataset: &str, request: &SearchRequest) -> Vec<String> {
        let sources = match self.normalizer.registry().resolve(dataset) {
            Ok(sources) => sources,
            Err(error) => {
                tracing::warn!(%dataset, %error, "Skipping dataset");
                return Vec::new();
            }
        };
        let Some(searcher) = &sources.searcher else {
            tracing::debug!(%dataset, "Dataset has no searcher");
            return Vec::new();
        };

        let timeout = self.settings.search_timeout();
        let hits = match tokio::time::timeout(timeout, searcher.search(request)).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(error)) => {
                tracing::warn!(%dataset, query = %request.query, %error, "Search failed");
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!(
                    %dataset,
                    query = %request.query,
                    timeout_ms = self.settings.search_timeout_ms,
                    "Search timed out"
                );
                return Vec::new();
            }
        };

        tracing::debug!(%dataset, query = %request.query, hits = hits.len(), "Search returned");
        hits.iter()
            .take(self.settings.max_search_hits)
            .map(|hit| sources.descriptor.to_local(hit))
            .collect()
    }
}
