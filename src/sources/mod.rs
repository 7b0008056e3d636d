//! Dataset sources: collaborator traits, the registry, and the shipped adapters

pub mod descriptor;
pub mod getty;
pub mod http;
pub mod linked_art;
pub mod lux;
pub mod met;
pub mod pleiades;
pub mod registry;
pub mod traits;
pub mod wikidata;

use std::sync::Arc;
use std::time::Duration;

pub use descriptor::SourceDescriptor;
pub use http::{DatasetClient, HttpFetcher};
pub use linked_art::LinkedArtMapper;
pub use registry::{DatasetSources, SourceRegistry, SourceRegistryBuilder};
pub use traits::{Fetcher, Mapper, RawRecord, SearchRequest, Searcher};

use crate::config::{AdapterKind, GatewayConfig};
use crate::error::ConfigError;

type Adapters = (Arc<dyn Fetcher>, Arc<dyn Mapper>, Option<Arc<dyn Searcher>>);

/// Wire every configured dataset to its HTTP adapters
pub fn build_registry(config: &GatewayConfig) -> Result<SourceRegistry, ConfigError> {
    let client = http::build_client(config.resolution.fetch_timeout())?;
    let mut builder = SourceRegistry::builder();

    for dataset in &config.datasets {
        let descriptor = SourceDescriptor::from_config(dataset);
        let interval = Duration::from_millis(dataset.rate_limit_ms);
        let http = || DatasetClient::new(client.clone(), interval);
        let fetcher = HttpFetcher::new(descriptor.clone(), http());
        let search = dataset.search.clone();

        let (fetcher, mapper, searcher): Adapters = match dataset.kind {
            AdapterKind::LinkedArt => (Arc::new(fetcher), Arc::new(LinkedArtMapper), None),
            AdapterKind::Getty => {
                let legacy = SourceDescriptor::new(
                    &dataset.name,
                    &dataset.namespace,
                    format!("{}{{identifier}}.jsonld", dataset.namespace),
                );
                let legacy = HttpFetcher::new(legacy, http());
                (
                    Arc::new(getty::GettyFetcher::new(fetcher, legacy, &dataset.namespace)),
                    Arc::new(LinkedArtMapper),
                    Some(Arc::new(getty::GettySearcher::new(search, http()))),
                )
            }
            AdapterKind::Lux => (
                Arc::new(fetcher),
                Arc::new(LinkedArtMapper),
                Some(Arc::new(lux::LuxSearcher::new(search, http()))),
            ),
            AdapterKind::Wikidata => (
                Arc::new(fetcher),
                Arc::new(wikidata::WikidataMapper::new(&dataset.namespace)),
                Some(Arc::new(wikidata::WikidataSearcher::new(search, http()))),
            ),
            AdapterKind::Pleiades => (
                Arc::new(fetcher),
                Arc::new(pleiades::PleiadesMapper::new(&dataset.namespace)),
                Some(Arc::new(pleiades::PleiadesSearcher::new(search, http()))),
            ),
            AdapterKind::Met => (
                Arc::new(met::MetFetcher::new(fetcher)),
                Arc::new(met::MetMapper::new(&dataset.namespace)?),
                Some(Arc::new(met::MetSearcher::new(search, http()))),
            ),
        };

        tracing::debug!(dataset = %dataset.name, kind = ?dataset.kind, "Registering dataset");
        builder = builder.register(descriptor, fetcher, mapper, searcher)?;
    }

    Ok(builder.build())
}
