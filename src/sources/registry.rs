//! Source registry mapping dataset names to their collaborators
//!
//! Built once through `SourceRegistryBuilder`, then shared read-only behind
//! an `Arc` by the normalizer and the search aggregator.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RegistryError, ResolveError};
use crate::sources::descriptor::{is_absolute, last_segment, SourceDescriptor};
use crate::sources::traits::{Fetcher, Mapper, Searcher};

/// The collaborators serving one dataset
#[derive(Clone)]
pub struct DatasetSources {
    pub descriptor: SourceDescriptor,
    pub fetcher: Arc<dyn Fetcher>,
    pub mapper: Arc<dyn Mapper>,
    /// `None` for datasets that cannot be searched by name
    pub searcher: Option<Arc<dyn Searcher>>,
}

impl std::fmt::Debug for DatasetSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetSources")
            .field("descriptor", &self.descriptor)
            .field("searchable", &self.searcher.is_some())
            .finish()
    }
}

/// Immutable registry of datasets keyed by name
#[derive(Debug, Default)]
pub struct SourceRegistry {
    datasets: HashMap<String, DatasetSources>,
    /// Registration order, used for listing and ownership lookups
    order: Vec<String>,
}

impl SourceRegistry {
    pub fn builder() -> SourceRegistryBuilder {
        SourceRegistryBuilder::default()
    }

    /// Look up a dataset's collaborators
    pub fn resolve(&self, name: &str) -> Result<&DatasetSources, ResolveError> {
        self.datasets
            .get(name)
            .ok_or_else(|| ResolveError::UnknownDataset(name.to_string()))
    }

    pub fn descriptor(&self, name: &str) -> Option<&SourceDescriptor> {
        self.datasets.get(name).map(|d| &d.descriptor)
    }

    /// Registered dataset names, in registration order
    pub fn datasets(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Decide which dataset serves `identifier` when referenced from `current`,
    /// and its local form there.
    ///
    /// Local identifiers stay in `current`. Absolute URIs go to `current` when
    /// it owns them, else to the first registered dataset that does, else stay
    /// in `current` reduced to their last path segment.
    pub fn locate(&self, current: &str, identifier: &str) -> (String, String) {
        let identifier = identifier.trim();
        let own = self.descriptor(current);

        if !is_absolute(identifier) {
            let local = match own {
                Some(descriptor) => descriptor.to_local(identifier),
                None => identifier.to_string(),
            };
            return (current.to_string(), local);
        }

        if let Some(local) = own.and_then(|d| d.local_part(identifier)) {
            return (current.to_string(), local);
        }

        for name in &self.order {
            if let Some(local) = self.datasets[name].descriptor.local_part(identifier) {
                return (name.clone(), local);
            }
        }

        (current.to_string(), last_segment(identifier).to_string())
    }
}

/// Collects datasets before freezing them into a `SourceRegistry`
#[derive(Default)]
pub struct SourceRegistryBuilder {
    datasets: HashMap<String, DatasetSources>,
    order: Vec<String>,
}

impl SourceRegistryBuilder {
    /// Register a dataset under its descriptor's name
    pub fn register(
        mut self,
        descriptor: SourceDescriptor,
        fetcher: Arc<dyn Fetcher>,
        mapper: Arc<dyn Mapper>,
        searcher: Option<Arc<dyn Searcher>>,
    ) -> Result<Self, RegistryError> {
        let name = descriptor.name.clone();
        if self.datasets.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.order.push(name.clone());
        self.datasets.insert(
            name,
            DatasetSources {
                descriptor,
                fetcher,
                mapper,
                searcher,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> SourceRegistry {
        SourceRegistry {
            datasets: self.datasets,
            order: self.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::sources::traits::RawRecord;
    use async_trait::async_trait;
    use linked_art_types::CanonicalRecord;

    struct NullFetcher;

    #[async_trait]
    impl Fetcher for NullFetcher {
        async fn fetch(&self, _identifier: &str) -> Result<Option<RawRecord>, SourceError> {
            Ok(None)
        }
    }

    struct NullMapper;

    impl Mapper for NullMapper {
        fn transform(&self, _raw: &RawRecord, _hint: &str) -> Result<CanonicalRecord, SourceError> {
            Err(SourceError::Unmappable("null".to_string()))
        }
    }

    fn register(
        builder: SourceRegistryBuilder,
        descriptor: SourceDescriptor,
    ) -> SourceRegistryBuilder {
        builder
            .register(descriptor, Arc::new(NullFetcher), Arc::new(NullMapper), None)
            .unwrap()
    }

    fn sample() -> SourceRegistry {
        let builder = register(
            SourceRegistry::builder(),
            SourceDescriptor::new("wikidata", "http://www.wikidata.org/entity/", "w/{identifier}")
                .with_matches(vec!["wikidata.org/wiki/".to_string()]),
        );
        register(
            builder,
            SourceDescriptor::new("getty", "http://vocab.getty.edu/", "g/{identifier}"),
        )
        .build()
    }

    #[test]
    fn test_unknown_dataset() {
        let registry = sample();
        assert!(registry.resolve("getty").is_ok());
        assert_eq!(
            registry.resolve("nope").unwrap_err(),
            ResolveError::UnknownDataset("nope".to_string())
        );
    }

    #[test]
    fn test_datasets_in_registration_order() {
        let registry = sample();
        assert_eq!(registry.datasets(), vec!["wikidata", "getty"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let builder = register(
            SourceRegistry::builder(),
            SourceDescriptor::new("a", "x/", "x/{identifier}"),
        );
        let result = builder.register(
            SourceDescriptor::new("a", "y/", "y/{identifier}"),
            Arc::new(NullFetcher),
            Arc::new(NullMapper),
            None,
        );
        assert!(matches!(result, Err(RegistryError::Duplicate(name)) if name == "a"));
    }

    #[test]
    fn test_locate() {
        let registry = sample();
        assert_eq!(
            registry.locate("wikidata", "Q90"),
            ("wikidata".to_string(), "Q90".to_string())
        );
        assert_eq!(
            registry.locate("wikidata", "https://www.wikidata.org/wiki/Q90"),
            ("wikidata".to_string(), "Q90".to_string())
        );
        // owned by another registered dataset
        assert_eq!(
            registry.locate("wikidata", "http://vocab.getty.edu/aat/300404670"),
            ("getty".to_string(), "aat/300404670".to_string())
        );
        // owned by nobody
        assert_eq!(
            registry.locate("getty", "https://example.org/id/42"),
            ("getty".to_string(), "42".to_string())
        );
    }
}
