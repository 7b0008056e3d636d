//! Record normalizer
//!
//! Every path into the gateway converges here: fetch, map, name, memoize,
//! then walk the canonical record's references to build a `SimplifiedRecord`.

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use linked_art_types::{CanonicalRecord, Description, EntityRef, Reference, SimplifiedRecord};
use std::sync::Arc;

use crate::config::ResolutionConfig;
use crate::error::ResolveError;
use crate::resolve::cache::{Outcome, ReferenceCache, ResolveKey, ResolvedEntry};
use crate::resolve::extract;
use crate::resolve::names::select_primary_name;
use crate::sources::{DatasetSources, SourceRegistry};

pub struct RecordNormalizer {
    registry: Arc<SourceRegistry>,
    cache: Arc<dyn ReferenceCache>,
    settings: ResolutionConfig,
}

impl RecordNormalizer {
    pub fn new(
        registry: Arc<SourceRegistry>,
        cache: Arc<dyn ReferenceCache>,
        settings: ResolutionConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    /// Resolve an identifier (absolute or local) to a lightweight reference
    pub async fn resolve_reference(
        &self,
        dataset: &str,
        identifier: &str,
        entity_type: &str,
    ) -> Result<Reference, ResolveError> {
        let local = self.localize(dataset, identifier)?;
        let entry = self.lookup(dataset, &local, entity_type).await?;
        Ok(entry.reference.clone())
    }

    /// Resolve an identifier to a fully simplified record.
    ///
    /// Only a failure to resolve the record itself is returned; failed
    /// sub-references are dropped from the result.
    pub async fn resolve_record(
        &self,
        dataset: &str,
        identifier: &str,
        entity_type: &str,
    ) -> Result<SimplifiedRecord, ResolveError> {
        let local = self.localize(dataset, identifier)?;
        let entry = self.lookup(dataset, &local, entity_type).await?;

        let scope = Scope {
            normalizer: self,
            dataset: dataset.to_string(),
            trail: vec![(dataset.to_string(), local)],
            depth: 0,
        };
        Ok(scope.simplify(&entry).await)
    }

    fn localize(&self, dataset: &str, identifier: &str) -> Result<String, ResolveError> {
        let sources = self.registry.resolve(dataset)?;
        Ok(sources.descriptor.to_local(identifier))
    }

    /// Memoized fetch + map + name for a local identifier
    async fn lookup(&self, dataset: &str, local: &str, entity_type: &str) -> Outcome {
        let sources = self.registry.resolve(dataset)?;
        let key = ResolveKey::new(dataset, local, entity_type);
        let compute = self.compute(sources, key.clone()).boxed();
        self.cache.get_or_resolve(&key, compute).await
    }

    async fn compute(&self, sources: &DatasetSources, key: ResolveKey) -> Outcome {
        let ResolveKey {
            dataset,
            identifier,
            entity_type,
        } = key;
        let timeout = self.settings.fetch_timeout();

        let fetched = tokio::time::timeout(timeout, sources.fetcher.fetch(&identifier)).await;
        let raw = match fetched {
            Err(_) => {
                tracing::warn!(%dataset, %identifier, "Fetch timed out");
                return Err(ResolveError::Timeout {
                    dataset,
                    identifier,
                    operation: "fetch",
                    timeout_ms: self.settings.fetch_timeout_ms,
                });
            }
            Ok(Err(error)) => {
                tracing::warn!(%dataset, %identifier, %error, "Fetch failed");
                return Err(ResolveError::Transport {
                    dataset,
                    identifier,
                    message: error.to_string(),
                });
            }
            Ok(Ok(None)) => return Err(ResolveError::NotFound { dataset, identifier }),
            Ok(Ok(Some(raw))) => raw,
        };

        let record = match sources.mapper.transform(&raw, &entity_type) {
            Ok(record) => record,
            Err(error) => {
                return Err(ResolveError::MappingFailed {
                    dataset,
                    identifier,
                    reason: error.to_string(),
                })
            }
        };

        let name = select_primary_name(&record.identified_by).and_then(|n| n.content.clone());
        let Some(name) = name else {
            return Err(ResolveError::NoPrimaryName { dataset, identifier });
        };

        tracing::debug!(%dataset, %identifier, %name, "Resolved reference");
        let reference = Reference::new(identifier, record.record_type.clone(), name);
        Ok(Arc::new(ResolvedEntry { reference, record }))
    }
}

/// One step of a top-level expansion: the dataset references are read in,
/// and the chain of records being expanded.
pub(crate) struct Scope<'a> {
    normalizer: &'a RecordNormalizer,
    dataset: String,
    trail: Vec<(String, String)>,
    depth: usize,
}

impl<'a> Scope<'a> {
    async fn simplify(&self, entry: &ResolvedEntry) -> SimplifiedRecord {
        let record = &entry.record;
        let (classifications, descriptions, part_of, member_of, details) = futures::join!(
            self.resolve_all(&record.classified_as),
            self.descriptions(record),
            self.resolve_all(record.parents()),
            self.resolve_all(&record.member_of),
            extract::details(self, record),
        );

        SimplifiedRecord {
            reference: entry.reference.clone(),
            classifications,
            descriptions,
            part_of,
            member_of,
            details,
        }
    }

    async fn descriptions(&self, record: &CanonicalRecord) -> Vec<Description> {
        let language = self.normalizer.settings.description_language.as_deref();
        let kept = record
            .referred_to_by
            .iter()
            .filter(|s| s.content.is_some())
            .filter(|s| match language {
                Some(code) => s.languages.is_empty() || s.declares_language(code),
                None => true,
            })
            .take(self.normalizer.settings.max_descriptions);

        join_all(kept.map(|statement| async move {
            Description {
                content: statement.content.clone().unwrap_or_default(),
                classifications: self.resolve_all(&statement.classifications).await,
            }
        }))
        .await
    }

    /// Resolve one reference met while reading the current record
    async fn resolve_id(&self, id: &str) -> Result<Reference, ResolveError> {
        let (dataset, local) = self.normalizer.registry.locate(&self.dataset, id);
        if self.on_trail(&dataset, &local) {
            return Err(ResolveError::Cycle {
                dataset,
                identifier: local,
            });
        }
        let entry = self.normalizer.lookup(&dataset, &local, "").await?;
        Ok(self.qualify(entry.reference.clone(), dataset))
    }

    /// Resolve every reference, dropping failures
    pub(crate) async fn resolve_all(&self, refs: &[EntityRef]) -> Vec<Reference> {
        let ids: Vec<&str> = refs.iter().filter_map(|r| r.id.as_deref()).collect();
        let outcomes = join_all(ids.iter().map(|id| self.resolve_id(id))).await;
        ids.into_iter()
            .zip(outcomes)
            .filter_map(|(id, outcome)| self.contain(id, outcome))
            .collect()
    }

    /// Resolve only the first reference, if any
    pub(crate) async fn resolve_first(&self, refs: &[EntityRef]) -> Option<Reference> {
        let id = refs.first()?.id.as_deref()?;
        let outcome = self.resolve_id(id).await;
        self.contain(id, outcome)
    }

    /// Embed the full simplified record behind a reference (`carries`, `shows`)
    fn expand<'b>(
        &'b self,
        id: &'b str,
    ) -> BoxFuture<'b, Result<SimplifiedRecord, ResolveError>> {
        async move {
            let (dataset, local) = self.normalizer.registry.locate(&self.dataset, id);
            if self.on_trail(&dataset, &local)
                || self.depth >= self.normalizer.settings.max_embed_depth
            {
                return Err(ResolveError::Cycle {
                    dataset,
                    identifier: local,
                });
            }
            let entry = self.normalizer.lookup(&dataset, &local, "").await?;

            let mut trail = self.trail.clone();
            trail.push((dataset.clone(), local));
            let child = Scope {
                normalizer: self.normalizer,
                dataset: dataset.clone(),
                trail,
                depth: self.depth + 1,
            };
            let mut record = child.simplify(&entry).await;
            record.reference = self.qualify(record.reference, dataset);
            Ok(record)
        }
        .boxed()
    }

    pub(crate) async fn expand_all(&self, refs: &[EntityRef]) -> Vec<SimplifiedRecord> {
        let ids: Vec<&str> = refs.iter().filter_map(|r| r.id.as_deref()).collect();
        let outcomes = join_all(ids.iter().map(|id| self.expand(id))).await;
        ids.into_iter()
            .zip(outcomes)
            .filter_map(|(id, outcome)| self.contain(id, outcome))
            .collect()
    }

    fn on_trail(&self, dataset: &str, local: &str) -> bool {
        self.trail.iter().any(|(d, l)| d == dataset && l == local)
    }

    /// References into another dataset carry that dataset's name
    fn qualify(&self, mut reference: Reference, dataset: String) -> Reference {
        if dataset != self.dataset {
            reference.dataset = Some(dataset);
        }
        reference
    }

    fn contain<T>(&self, id: &str, outcome: Result<T, ResolveError>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(
                    dataset = %self.dataset,
                    identifier = id,
                    %error,
                    "Dropping unresolved reference"
                );
                None
            }
        }
    }
}
