//! Metropolitan Museum of Art collection API
//!
//! The Met serves its own object JSON. One object yields two records: the
//! HumanMadeObject itself and, when it is tagged, the VisualItem it shows
//! (local identifier `vi/{objectID}`).

use async_trait::async_trait;
use linked_art_types::{CanonicalRecord, EntityRef, Event, Statement, TimeSpan};
use regex::Regex;
use serde_json::Value;

use crate::error::SourceError;
use crate::sources::http::{DatasetClient, HttpFetcher};
use crate::sources::traits::{Fetcher, Mapper, RawRecord, SearchRequest, Searcher};

pub const DEFAULT_SEARCH_ENDPOINT: &str =
    "https://collectionapi.metmuseum.org/public/collection/v1/search";

const VISUAL_ITEM_PREFIX: &str = "vi/";

const AAT_PAINTING: &str = "http://vocab.getty.edu/aat/300033618";
const AAT_COIN: &str = "http://vocab.getty.edu/aat/300037222";
const AAT_ACCESSION_NUMBER: &str = "http://vocab.getty.edu/aat/300312355";
const AAT_MATERIAL_STATEMENT: &str = "http://vocab.getty.edu/aat/300435429";
const AAT_DIMENSION_STATEMENT: &str = "http://vocab.getty.edu/aat/300435430";
const AAT_CREDIT_LINE: &str = "http://vocab.getty.edu/aat/300026687";

// =============================================================================
// Fetcher
// =============================================================================

/// Object fetcher that also serves `vi/{id}` from the object payload
pub struct MetFetcher {
    inner: HttpFetcher,
}

impl MetFetcher {
    pub fn new(inner: HttpFetcher) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Fetcher for MetFetcher {
    async fn fetch(&self, identifier: &str) -> Result<Option<RawRecord>, SourceError> {
        match identifier.strip_prefix(VISUAL_ITEM_PREFIX) {
            Some(object_id) => Ok(self.inner.fetch(object_id).await?.map(|mut raw| {
                raw.identifier = identifier.to_string();
                raw
            })),
            None => self.inner.fetch(identifier).await,
        }
    }
}

// =============================================================================
// Searcher
// =============================================================================

pub struct MetSearcher {
    endpoint: String,
    http: DatasetClient,
}

impl MetSearcher {
    pub fn new(endpoint: Option<String>, http: DatasetClient) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            http,
        }
    }
}

#[async_trait]
impl Searcher for MetSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        let query = self
            .http
            .get(&self.endpoint)
            .query(&[("q", request.query.as_str())]);
        let response = self.http.send_json(query).await?;
        Ok(parse_object_ids(&response))
    }
}

/// `objectIDs`, which the API returns as null when nothing matched
pub fn parse_object_ids(response: &Value) -> Vec<String> {
    response
        .get("objectIDs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|id| match id {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Mapper
// =============================================================================

pub struct MetMapper {
    namespace: String,
    year: Regex,
}

impl MetMapper {
    pub fn new(namespace: impl Into<String>) -> Result<Self, SourceError> {
        Ok(Self {
            namespace: namespace.into(),
            year: Regex::new(r"\d{3,4}")?,
        })
    }

    fn object(&self, data: &Value, object_id: &str, title: &str) -> CanonicalRecord {
        let mut item = CanonicalRecord::new(
            "HumanMadeObject",
            Some(format!("{}{}", self.namespace, object_id)),
            Some(title.to_string()),
        );

        item.identified_by.push(Statement::primary_name(title));
        if let Some(accession) = non_empty_str(data, "accessionNumber") {
            item.identified_by.push(Statement {
                statement_type: Some("Identifier".to_string()),
                content: Some(accession.to_string()),
                classifications: vec![EntityRef::new(AAT_ACCESSION_NUMBER)],
                ..Statement::default()
            });
        }
        item.identified_by.push(Statement {
            statement_type: Some("Identifier".to_string()),
            content: Some(object_id.to_string()),
            ..Statement::default()
        });

        for (field, classification) in [
            ("medium", AAT_MATERIAL_STATEMENT),
            ("dimensions", AAT_DIMENSION_STATEMENT),
            ("creditLine", AAT_CREDIT_LINE),
        ] {
            if let Some(content) = non_empty_str(data, field) {
                item.referred_to_by.push(
                    Statement::text(content).with_classification(EntityRef::new(classification)),
                );
            }
        }

        let classification = non_empty_str(data, "classification")
            .or_else(|| non_empty_str(data, "objectName"));
        match classification {
            Some("Painting") | Some("Paintings") => {
                item.classified_as.push(EntityRef::new(AAT_PAINTING))
            }
            Some("Coins") => item.classified_as.push(EntityRef::new(AAT_COIN)),
            _ => {}
        }

        if let Some(wikidata) = non_empty_str(data, "objectWikidata_URL") {
            item.equivalent.push(EntityRef::typed(
                canonicalize(wikidata),
                "HumanMadeObject",
                Some(title.to_string()),
            ));
        }

        item.produced_by = self.production(data);

        if data.get("tags").and_then(Value::as_array).is_some_and(|t| !t.is_empty()) {
            item.shows.push(EntityRef::typed(
                format!("{}{}{}", self.namespace, VISUAL_ITEM_PREFIX, object_id),
                "VisualItem",
                None,
            ));
        }
        item
    }

    fn production(&self, data: &Value) -> Option<Event> {
        let mut production = Event::of_type("Production");

        let begin = data.get("objectBeginDate").and_then(Value::as_i64);
        let end = data.get("objectEndDate").and_then(Value::as_i64);
        let timespan = if begin.is_some() || end.is_some() {
            Some(TimeSpan {
                begin_of_the_begin: begin.map(|y| format!("{}-01-01T00:00:00", y)),
                end_of_the_end: end.map(|y| format!("{}-12-31T23:59:59", y)),
            })
        } else {
            non_empty_str(data, "objectDate").and_then(|date| self.parse_display_date(date))
        };
        production.timespan = timespan;

        // ULAN is preferred over Wikidata; artists without either stay unlinked
        let artist = non_empty_str(data, "artistULAN_URL")
            .or_else(|| non_empty_str(data, "artistWikidata_URL"));
        if let Some(uri) = artist {
            production.carried_out_by.push(EntityRef::typed(
                canonicalize(uri),
                "Person",
                non_empty_str(data, "artistDisplayName").map(str::to_string),
            ));
        }

        (!production.is_empty()).then_some(production)
    }

    /// Years in a display date such as "ca. 1875" or "1860-1870"
    fn parse_display_date(&self, date: &str) -> Option<TimeSpan> {
        let mut years = self.year.find_iter(date).map(|m| m.as_str());
        let first = years.next()?;
        let last = years.last().unwrap_or(first);
        Some(TimeSpan {
            begin_of_the_begin: Some(format!("{}-01-01T00:00:00", first)),
            end_of_the_end: Some(format!("{}-12-31T23:59:59", last)),
        })
    }

    fn visual_item(&self, data: &Value, object_id: &str, title: &str) -> CanonicalRecord {
        let mut visual = CanonicalRecord::new(
            "VisualItem",
            Some(format!("{}{}{}", self.namespace, VISUAL_ITEM_PREFIX, object_id)),
            Some(format!("Visual content of {}", title)),
        );
        visual
            .identified_by
            .push(Statement::primary_name(format!("Visual content of {}", title)));

        let tags = data.get("tags").and_then(Value::as_array);
        for tag in tags.into_iter().flatten() {
            let uri = non_empty_str(tag, "AAT_URL").or_else(|| non_empty_str(tag, "Wikidata_URL"));
            if let Some(uri) = uri {
                visual.about.push(EntityRef::typed(
                    canonicalize(uri),
                    "Type",
                    non_empty_str(tag, "term").map(str::to_string),
                ));
            }
        }
        visual
    }
}

impl Mapper for MetMapper {
    fn transform(
        &self,
        raw: &RawRecord,
        _entity_type: &str,
    ) -> Result<CanonicalRecord, SourceError> {
        let data = &raw.data;
        let object_id = match data.get("objectID") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(SourceError::Unmappable(format!(
                    "'{}' has no objectID",
                    raw.identifier
                )))
            }
        };
        let title = non_empty_str(data, "title").unwrap_or("Untitled");

        if raw.identifier.starts_with(VISUAL_ITEM_PREFIX) {
            Ok(self.visual_item(data, &object_id, title))
        } else {
            Ok(self.object(data, &object_id, title))
        }
    }
}

fn non_empty_str<'a>(data: &'a Value, field: &str) -> Option<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Getty "page" URLs and Wikidata wiki pages point at human-readable views;
/// rewrite them to the entity URIs the other datasets use.
pub fn canonicalize(uri: &str) -> String {
    if uri.contains("vocab.getty.edu") {
        uri.replace("/page", "")
    } else if uri.contains("wikidata") {
        let qid = uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri);
        format!("http://www.wikidata.org/entity/{}", qid)
    } else {
        uri.to_string()
    }
}
