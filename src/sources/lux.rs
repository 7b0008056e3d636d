//! LUX (Yale) search API searcher
//!
//! LUX records are Linked Art and go through `LinkedArtMapper`.

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use crate::error::SourceError;
use crate::sources::http::DatasetClient;
use crate::sources::traits::{SearchRequest, Searcher};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://lux.collections.yale.edu/api/search/";

pub struct LuxSearcher {
    endpoint: String,
    http: DatasetClient,
}

impl LuxSearcher {
    pub fn new(endpoint: Option<String>, http: DatasetClient) -> Self {
        let mut endpoint = endpoint.unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string());
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        Self { endpoint, http }
    }
}

#[async_trait]
impl Searcher for LuxSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        let (scope, q) = build_query(&request.query, &request.entity_type);
        let url = Url::parse(&self.endpoint)?.join(scope)?;
        let query = self.http.get(url.as_str()).query(&[("q", q.to_string())]);
        let response = self.http.send_json(query).await?;
        Ok(parse_ordered_items(&response))
    }
}

/// Search scope and JSON query for an entity-type hint
pub fn build_query(name: &str, entity_type: &str) -> (&'static str, Value) {
    match entity_type {
        "Person" => (
            "agent",
            json!({"AND": [{"recordType": "person"}, {"name": name}]}),
        ),
        "Group" => (
            "agent",
            json!({"AND": [{"recordType": "group"}, {"name": name}]}),
        ),
        "Place" => ("place", json!({"AND": [{"name": name}]})),
        "HumanMadeObject" => ("item", json!({"AND": [{"name": name}]})),
        "LinguisticObject" | "VisualItem" => ("work", json!({"AND": [{"name": name}]})),
        _ => ("concept", json!({"AND": [{"name": name}]})),
    }
}

/// `orderedItems[].id`
pub fn parse_ordered_items(response: &Value) -> Vec<String> {
    response
        .get("orderedItems")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
