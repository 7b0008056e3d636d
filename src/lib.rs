//! Linked Art Gateway
//!
//! Resolves cultural-heritage authority records (people, groups, places,
//! objects, works) from external datasets and normalizes them into one
//! flattened record shape.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          GatewayService                             │
//! │     search_by_name(datasets, name)        get_by_id(dataset, id)    │
//! └───────────────┬─────────────────────────────────────┬───────────────┘
//!                 │                                     │
//!                 ▼                                     │
//! ┌───────────────────────────────┐                     │
//! │       SearchAggregator        │                     │
//! │  Searcher per dataset, top N  │                     │
//! └───────────────┬───────────────┘                     │
//!                 ▼                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         RecordNormalizer                            │
//! │   fetch ─► map ─► primary name ─► ReferenceCache (single-flight)    │
//! │   then walk references concurrently into a SimplifiedRecord         │
//! └───────────────────────────────┬─────────────────────────────────────┘
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          SourceRegistry                             │
//! │  wikidata │ getty │ lux │ pleiades │ met │ ... (Fetcher/Mapper/     │
//! │                                             Searcher per dataset)   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = GatewayConfig::from_file("config/datasets.yaml")?;
//! let service = GatewayService::from_config(&config)?;
//! let found = service.get_by_id("wikidata", "Q296", "Person").await?;
//! ```

pub mod config;
pub mod error;
pub mod resolve;
pub mod search;
pub mod service;
pub mod sources;

#[cfg(feature = "server")]
pub mod api;

pub use config::GatewayConfig;
pub use error::{ConfigError, RegistryError, ResolveError, SourceError};
pub use resolve::{RecordNormalizer, ReferenceCache, SingleFlightCache};
pub use search::SearchAggregator;
pub use service::GatewayService;
pub use sources::{Fetcher, Mapper, RawRecord, SearchRequest, Searcher, SourceRegistry};
