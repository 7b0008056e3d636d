//! Reference cache
//!
//! Memoizes the outcome of resolving one (dataset, identifier, type hint)
//! key. Failures are memoized too, except transient ones (timeouts and
//! transport errors), which are handed to concurrent waiters and then
//! forgotten.
//!
//! ## Implementations
//!
//! - `SingleFlightCache`: bounded moka store plus DashMap-based in-flight
//!   tracking, so concurrent requests for one key share one computation
//! - `NoCache`: always computes; for tests that need to observe every call

use async_trait::async_trait;
use futures::future::BoxFuture;
use linked_art_types::{CanonicalRecord, Reference};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::error::ResolveError;

/// Cache key: identifiers are always in local form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolveKey {
    pub dataset: String,
    pub identifier: String,
    pub entity_type: String,
}

impl ResolveKey {
    pub fn new(
        dataset: impl Into<String>,
        identifier: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            identifier: identifier.into(),
            entity_type: entity_type.into(),
        }
    }
}

/// A resolved reference together with the canonical record it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry {
    pub reference: Reference,
    pub record: CanonicalRecord,
}

pub type Outcome = Result<Arc<ResolvedEntry>, ResolveError>;

/// Get-or-compute memoization of resolution outcomes
#[async_trait]
pub trait ReferenceCache: Send + Sync {
    /// Return the memoized outcome for `key`, or drive `compute` and memoize it.
    ///
    /// `compute` is only polled when no outcome is resident and no other
    /// caller is already computing the same key.
    async fn get_or_resolve(&self, key: &ResolveKey, compute: BoxFuture<'_, Outcome>) -> Outcome;

    /// Number of resident outcomes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

/// A cache that never memoizes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl ReferenceCache for NoCache {
    async fn get_or_resolve(&self, _key: &ResolveKey, compute: BoxFuture<'_, Outcome>) -> Outcome {
        compute.await
    }

    fn len(&self) -> u64 {
        0
    }

    fn clear(&self) {}
}

type InFlightSender = Arc<tokio::sync::watch::Sender<Option<Outcome>>>;

type InFlightMap = dashmap::DashMap<ResolveKey, InFlightSender>;

/// Removes the in-flight entry when the computing task finishes or is dropped,
/// so waiters observe channel closure instead of hanging.
struct InFlightGuard<'a> {
    key: ResolveKey,
    map: &'a InFlightMap,
    tx: InFlightSender,
    finished: bool,
}

impl<'a> InFlightGuard<'a> {
    fn new(key: ResolveKey, map: &'a InFlightMap, tx: InFlightSender) -> Self {
        Self {
            key,
            map,
            tx,
            finished: false,
        }
    }

    fn finish(mut self, outcome: Outcome) {
        // Send before removing so late subscribers still observe the outcome.
        let _ = self.tx.send(Some(outcome));
        self.map.remove(&self.key);
        self.finished = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.map.remove(&self.key);
        }
    }
}

enum Role {
    Wait(tokio::sync::watch::Receiver<Option<Outcome>>),
    Compute(InFlightSender),
}

/// Bounded single-flight cache backed by moka
pub struct SingleFlightCache {
    cache: moka::sync::Cache<ResolveKey, Outcome>,
    in_flight: InFlightMap,
}

impl std::fmt::Debug for SingleFlightCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("entry_count", &self.cache.entry_count())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl SingleFlightCache {
    pub fn new(max_entries: u64) -> Self {
        Self::build(max_entries, None)
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::build(config.capacity, config.ttl_secs.map(Duration::from_secs))
    }

    fn build(max_entries: u64, ttl: Option<Duration>) -> Self {
        let mut builder = moka::sync::Cache::builder().max_capacity(max_entries);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
            in_flight: dashmap::DashMap::new(),
        }
    }

    fn claim(&self, key: &ResolveKey) -> Role {
        use dashmap::mapref::entry::Entry;
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => Role::Wait(entry.get().subscribe()),
            Entry::Vacant(entry) => {
                let (tx, _rx) = tokio::sync::watch::channel(None::<Outcome>);
                let tx = Arc::new(tx);
                entry.insert(tx.clone());
                Role::Compute(tx)
            }
        }
    }
}

#[async_trait]
impl ReferenceCache for SingleFlightCache {
    async fn get_or_resolve(&self, key: &ResolveKey, compute: BoxFuture<'_, Outcome>) -> Outcome {
        let tx = loop {
            if let Some(outcome) = self.cache.get(key) {
                return outcome;
            }
            match self.claim(key) {
                Role::Compute(tx) => break tx,
                Role::Wait(mut rx) => loop {
                    if let Some(outcome) = rx.borrow().as_ref() {
                        return outcome.clone();
                    }
                    if rx.changed().await.is_err() {
                        // Computing task was dropped; start over
                        break;
                    }
                },
            }
        };

        let guard = InFlightGuard::new(key.clone(), &self.in_flight, tx);

        // Another task may have finished between the cache miss and the claim
        if let Some(outcome) = self.cache.get(key) {
            guard.finish(outcome.clone());
            return outcome;
        }

        let outcome = compute.await;
        match &outcome {
            Err(error) if error.is_transient() => {
                tracing::debug!(
                    dataset = %key.dataset,
                    identifier = %key.identifier,
                    %error,
                    "Not caching transient failure"
                );
            }
            _ => self.cache.insert(key.clone(), outcome.clone()),
        }
        guard.finish(outcome.clone());
        outcome
    }

    fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn clear(&self) {
        self.cache.invalidate_all();
        // Drop all senders so waiters observe closure and retry.
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(name: &str) -> Arc<ResolvedEntry> {
        Arc::new(ResolvedEntry {
            reference: Reference::new("Q1", "Person", name),
            record: CanonicalRecord::new("Person", None, None),
        })
    }

    fn counted(calls: &AtomicUsize, outcome: Outcome) -> BoxFuture<'_, Outcome> {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            outcome
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_memoizes_success() {
        let cache = SingleFlightCache::new(100);
        let key = ResolveKey::new("wikidata", "Q1", "");
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_resolve(&key, counted(&calls, Ok(entry("A")))).await;
        let second = cache.get_or_resolve(&key, counted(&calls, Ok(entry("B")))).await;

        assert_eq!(first.unwrap().reference.name, "A");
        assert_eq!(second.unwrap().reference.name, "A");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_memoizes_permanent_failure() {
        let cache = SingleFlightCache::new(100);
        let key = ResolveKey::new("wikidata", "Q0", "");
        let calls = AtomicUsize::new(0);
        let not_found = ResolveError::NotFound {
            dataset: "wikidata".to_string(),
            identifier: "Q0".to_string(),
        };

        let first = cache.get_or_resolve(&key, counted(&calls, Err(not_found.clone()))).await;
        let second = cache.get_or_resolve(&key, counted(&calls, Ok(entry("late")))).await;

        assert_eq!(first.unwrap_err(), not_found);
        assert_eq!(second.unwrap_err(), not_found);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_not_retained() {
        let cache = SingleFlightCache::new(100);
        let key = ResolveKey::new("lux", "person/1", "");
        let calls = AtomicUsize::new(0);
        let timeout = ResolveError::Timeout {
            dataset: "lux".to_string(),
            identifier: "person/1".to_string(),
            operation: "fetch",
            timeout_ms: 10,
        };

        assert!(cache.get_or_resolve(&key, counted(&calls, Err(timeout))).await.is_err());
        assert!(cache.get_or_resolve(&key, counted(&calls, Ok(entry("A")))).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_computation() {
        let cache = Arc::new(SingleFlightCache::new(100));
        let key = ResolveKey::new("getty", "ulan/500019484", "Person");
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let key = key.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    let compute = async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(entry("Claude Monet"))
                    }
                    .boxed();
                    cache.get_or_resolve(&key, compute).await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().reference.name, "Claude Monet");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_computation_does_not_strand_waiters() {
        let cache = Arc::new(SingleFlightCache::new(100));
        let key = ResolveKey::new("met", "437133", "");

        let stuck = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let never = futures::future::pending::<Outcome>().boxed();
                cache.get_or_resolve(&key, never).await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let waiter = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .get_or_resolve(&key, async { Ok(entry("recovered")) }.boxed())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        stuck.abort();

        let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must not hang")
            .unwrap();
        assert_eq!(outcome.unwrap().reference.name, "recovered");
    }

    #[tokio::test]
    async fn test_no_cache_always_computes() {
        let cache = NoCache;
        let key = ResolveKey::new("wikidata", "Q1", "");
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let _ = cache.get_or_resolve(&key, counted(&calls, Ok(entry("A")))).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.is_empty());
    }
}
