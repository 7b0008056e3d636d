//! Getty vocabularies: retired-identifier fallback and SPARQL full-text searcher
//!
//! Getty records themselves are Linked Art and go through `LinkedArtMapper`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SourceError;
use crate::sources::http::{DatasetClient, HttpFetcher};
use crate::sources::traits::{Fetcher, RawRecord, SearchRequest, Searcher};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://vocab.getty.edu/sparql.json";

const IS_REPLACED_BY: &str = "http://purl.org/dc/terms/isReplacedBy";
const LINKED_ART_BASE: &str = "https://data.getty.edu/vocab/";
const VOCAB_BASE: &str = "http://vocab.getty.edu/";

// =============================================================================
// Fetcher
// =============================================================================

/// Linked Art fetcher that follows retired identifiers to their replacement.
///
/// Retired ULAN/AAT/TGN records are gone from the Linked Art endpoint but
/// still published as legacy JSON-LD (`{namespace}{vocab}/{id}.jsonld`)
/// carrying a `dcterms:isReplacedBy` link. One hop is followed.
pub struct GettyFetcher<F = HttpFetcher> {
    current: F,
    legacy: F,
    namespace: String,
}

impl<F: Fetcher> GettyFetcher<F> {
    pub fn new(current: F, legacy: F, namespace: impl Into<String>) -> Self {
        Self {
            current,
            legacy,
            namespace: namespace.into(),
        }
    }

    /// Local identifier that replaces a retired one, read from legacy JSON-LD
    async fn replacement(&self, identifier: &str) -> Result<Option<String>, SourceError> {
        let Some(legacy) = self.legacy.fetch(identifier).await? else {
            return Ok(None);
        };
        Ok(replacement_id(&legacy.data, &self.namespace).filter(|id| id != identifier))
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for GettyFetcher<F> {
    async fn fetch(&self, identifier: &str) -> Result<Option<RawRecord>, SourceError> {
        let failure = match self.current.fetch(identifier).await {
            Ok(Some(raw)) => return Ok(Some(with_vocab_id(raw))),
            Ok(None) => None,
            Err(error) => Some(error),
        };

        let replacement = match (self.replacement(identifier).await, failure) {
            (Ok(Some(replacement)), _) => replacement,
            (_, Some(error)) => return Err(error),
            (Ok(None), None) => return Ok(None),
            (Err(error), None) => return Err(error),
        };

        tracing::info!(%identifier, %replacement, "Following retired Getty identifier");
        Ok(self.current.fetch(&replacement).await?.map(with_vocab_id))
    }
}

/// `[0]["dcterms:isReplacedBy"][0]["@id"]` of a legacy payload, as a local identifier
pub fn replacement_id(data: &Value, namespace: &str) -> Option<String> {
    let uri = data
        .as_array()?
        .first()?
        .get(IS_REPLACED_BY)?
        .as_array()?
        .first()?
        .get("@id")?
        .as_str()?;
    let local = uri.strip_prefix(namespace)?.trim_matches('/');
    (!local.is_empty()).then(|| local.to_string())
}

/// Linked Art payloads name themselves under data.getty.edu; rewrite to the vocab URI
fn with_vocab_id(mut raw: RawRecord) -> RawRecord {
    if let Some(Value::String(id)) = raw.data.get_mut("id") {
        if id.contains(LINKED_ART_BASE) {
            *id = id.replace(LINKED_ART_BASE, VOCAB_BASE);
        }
    }
    raw
}

// =============================================================================
// Searcher
// =============================================================================

pub struct GettySearcher {
    endpoint: String,
    http: DatasetClient,
}

impl GettySearcher {
    pub fn new(endpoint: Option<String>, http: DatasetClient) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            http,
        }
    }
}

#[async_trait]
impl Searcher for GettySearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        let sparql = build_query(&request.query, &request.entity_type);
        let query = self
            .http
            .get(&self.endpoint)
            .query(&[("query", sparql.as_str())]);
        let response = self.http.send_json(query).await?;
        Ok(parse_bindings(&response))
    }
}

fn concept_class(entity_type: &str) -> Option<&'static str> {
    match entity_type {
        "Person" => Some("gvp:PersonConcept"),
        "Group" => Some("gvp:GroupConcept"),
        "Place" => Some("gvp:PlaceConcept"),
        _ => None,
    }
}

/// `luc:term` lookup, constrained to the concept class of the hint when known
pub fn build_query(term: &str, entity_type: &str) -> String {
    let term = term.replace('\\', "\\\\").replace('"', "\\\"");
    match concept_class(entity_type) {
        Some(class) => format!(
            "SELECT ?subject WHERE {{ ?subject luc:term \"{}\" ; a {} . }}",
            term, class
        ),
        None => format!("SELECT ?subject WHERE {{ ?subject luc:term \"{}\" . }}", term),
    }
}

/// `results.bindings[].subject.value`
pub fn parse_bindings(response: &Value) -> Vec<String> {
    response
        .pointer("/results/bindings")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|b| b.pointer("/subject/value").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    const NS: &str = "http://vocab.getty.edu/";

    #[derive(Default)]
    struct MapFetcher {
        records: HashMap<String, Value>,
        failing: bool,
    }

    impl MapFetcher {
        fn with(mut self, local: &str, data: Value) -> Self {
            self.records.insert(local.to_string(), data);
            self
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, identifier: &str) -> Result<Option<RawRecord>, SourceError> {
            if self.failing {
                return Err(SourceError::Status {
                    status: 503,
                    url: identifier.to_string(),
                });
            }
            Ok(self
                .records
                .get(identifier)
                .map(|data| RawRecord::new(data.clone(), identifier, "getty")))
        }
    }

    fn retired() -> Value {
        json!([{
            "@id": "http://vocab.getty.edu/ulan/500000001",
            "http://purl.org/dc/terms/isReplacedBy": [
                {"@id": "http://vocab.getty.edu/ulan/500019484"}
            ]
        }])
    }

    fn monet() -> Value {
        json!({
            "id": "https://data.getty.edu/vocab/ulan/500019484",
            "type": "Person",
            "_label": "Monet, Claude"
        })
    }

    #[test]
    fn test_replacement_id() {
        assert_eq!(replacement_id(&retired(), NS).as_deref(), Some("ulan/500019484"));
        // not an array, no link, or a foreign replacement
        assert!(replacement_id(&monet(), NS).is_none());
        let unlinked = json!([{"@id": "http://vocab.getty.edu/ulan/1"}]);
        assert!(replacement_id(&unlinked, NS).is_none());
        let foreign = json!([{
            "http://purl.org/dc/terms/isReplacedBy": [{"@id": "http://example.org/x/1"}]
        }]);
        assert!(replacement_id(&foreign, NS).is_none());
    }

    #[tokio::test]
    async fn test_retired_identifier_follows_replacement() {
        let current = MapFetcher::default().with("ulan/500019484", monet());
        let legacy = MapFetcher::default().with("ulan/500000001", retired());
        let fetcher = GettyFetcher::new(current, legacy, NS);

        let raw = fetcher.fetch("ulan/500000001").await.unwrap().unwrap();
        assert_eq!(raw.identifier, "ulan/500019484");
        assert_eq!(raw.data["id"], "http://vocab.getty.edu/ulan/500019484");
    }

    #[tokio::test]
    async fn test_current_identifier_skips_legacy() {
        let current = MapFetcher::default().with("ulan/500019484", monet());
        let legacy = MapFetcher {
            failing: true,
            ..MapFetcher::default()
        };
        let fetcher = GettyFetcher::new(current, legacy, NS);

        let raw = fetcher.fetch("ulan/500019484").await.unwrap().unwrap();
        assert_eq!(raw.data["id"], "http://vocab.getty.edu/ulan/500019484");
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found() {
        let fetcher = GettyFetcher::new(MapFetcher::default(), MapFetcher::default(), NS);
        assert!(fetcher.fetch("ulan/1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_failure_falls_back_to_legacy() {
        let current = MapFetcher {
            failing: true,
            ..MapFetcher::default()
        };
        let legacy = MapFetcher::default().with("ulan/500000001", retired());
        let fetcher = GettyFetcher::new(current, legacy, NS);
        // the replacement is fetched from the same failing endpoint
        assert!(fetcher.fetch("ulan/500000001").await.is_err());

        let current = MapFetcher {
            failing: true,
            ..MapFetcher::default()
        };
        let fetcher = GettyFetcher::new(current, MapFetcher::default(), NS);
        assert!(fetcher.fetch("ulan/500000001").await.is_err());
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query("monet", "Person"),
            "SELECT ?subject WHERE { ?subject luc:term \"monet\" ; a gvp:PersonConcept . }"
        );
        assert_eq!(
            build_query("say \"hi\"", ""),
            "SELECT ?subject WHERE { ?subject luc:term \"say \\\"hi\\\"\" . }"
        );
    }

    #[test]
    fn test_parse_bindings() {
        let response = json!({
            "head": {"vars": ["subject"]},
            "results": {"bindings": [
                {"subject": {"type": "uri", "value": "http://vocab.getty.edu/ulan/500019484"}},
                {"subject": {"type": "uri", "value": "http://vocab.getty.edu/ulan/500191427"}}
            ]}
        });
        assert_eq!(
            parse_bindings(&response),
            vec![
                "http://vocab.getty.edu/ulan/500019484",
                "http://vocab.getty.edu/ulan/500191427"
            ]
        );
    }
}
