//! Wikidata adapter: `wbsearchentities` searcher and entity JSON mapper
//!
//! Wikidata does not publish Linked Art, so the mapper builds the canonical
//! shape from labels, descriptions and a fixed set of claims.

use async_trait::async_trait;
use linked_art_types::{CanonicalRecord, EntityKind, EntityRef, Event, Statement, TimeSpan};
use serde_json::{Map, Value};

use crate::error::SourceError;
use crate::sources::http::DatasetClient;
use crate::sources::traits::{Mapper, RawRecord, SearchRequest, Searcher};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";

// Properties read by the mapper
const INSTANCE_OF: &str = "P31";
const DATE_OF_BIRTH: &str = "P569";
const DATE_OF_DEATH: &str = "P570";
const PLACE_OF_BIRTH: &str = "P19";
const PLACE_OF_DEATH: &str = "P20";
const INCEPTION: &str = "P571";
const DISSOLVED: &str = "P576";
const FOUNDED_BY: &str = "P112";
const FORMATION_LOCATION: &str = "P740";
const PART_OF: &str = "P361";
const LOCATED_IN: &str = "P131";
const MEMBER_OF: &str = "P463";
const COORDINATES: &str = "P625";
const CREATOR: &str = "P170";
const MATERIAL: &str = "P186";
const MAIN_SUBJECT: &str = "P921";

const HUMAN: &str = "Q5";

const GROUP_CLASSES: &[&str] = &[
    "Q43229",   // organization
    "Q4830453", // business
    "Q3918",    // university
    "Q33506",   // museum
    "Q7278",    // political party
    "Q215380",  // musical group
    "Q16887380", // group
    "Q2085381", // publisher
    "Q31855",   // research institute
    "Q163740",  // nonprofit organization
];

const PLACE_CLASSES: &[&str] = &[
    "Q515",     // city
    "Q6256",    // country
    "Q486972",  // human settlement
    "Q5119",    // capital
    "Q1549591", // big city
    "Q3957",    // town
    "Q532",     // village
    "Q82794",   // geographic region
    "Q35657",   // U.S. state
    "Q15284",   // municipality
    "Q484170",  // commune of France
    "Q747074",  // comune of Italy
    "Q23442",   // island
    "Q8502",    // mountain
    "Q4022",    // river
];

const OBJECT_CLASSES: &[&str] = &[
    "Q3305213", // painting
    "Q860861",  // sculpture
    "Q11060274", // print
    "Q93184",   // drawing
];

// =============================================================================
// Searcher
// =============================================================================

pub struct WikidataSearcher {
    endpoint: String,
    http: DatasetClient,
}

impl WikidataSearcher {
    pub fn new(endpoint: Option<String>, http: DatasetClient) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            http,
        }
    }
}

#[async_trait]
impl Searcher for WikidataSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        let lang = if request.lang.is_empty() { "en" } else { request.lang.as_str() };
        let query = self.http.get(&self.endpoint).query(&[
            ("action", "wbsearchentities"),
            ("format", "json"),
            ("type", "item"),
            ("search", request.query.as_str()),
            ("language", lang),
        ]);
        let response = self.http.send_json(query).await?;
        Ok(parse_search_response(&response))
    }
}

/// Entity ids from a `wbsearchentities` response, de-duplicated, order kept
pub fn parse_search_response(response: &Value) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let hits = response.get("search").and_then(Value::as_array);
    for hit in hits.into_iter().flatten() {
        if let Some(id) = hit.get("id").and_then(Value::as_str) {
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

// =============================================================================
// Mapper
// =============================================================================

/// Builds canonical records from `Special:EntityData` JSON
pub struct WikidataMapper {
    namespace: String,
}

impl WikidataMapper {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn entity_ref(&self, qid: &str) -> EntityRef {
        EntityRef::new(format!("{}{}", self.namespace, qid))
    }

    fn refs(&self, entity: &Value, property: &str) -> Vec<EntityRef> {
        claim_ids(entity, property)
            .iter()
            .map(|qid| self.entity_ref(qid))
            .collect()
    }

    /// Event from a date claim, a place claim and an actor claim; `None` when all are absent
    fn event(
        &self,
        entity: &Value,
        event_type: &str,
        date: &str,
        place: Option<&str>,
        actors: Option<&str>,
    ) -> Option<Event> {
        let mut event = Event::of_type(event_type);
        if let Some(time) = claim_time(entity, date) {
            event.timespan = Some(TimeSpan {
                begin_of_the_begin: Some(time),
                end_of_the_end: None,
            });
        }
        if let Some(place) = place {
            event.took_place_at = self.refs(entity, place).into_iter().take(1).collect();
        }
        if let Some(actors) = actors {
            event.carried_out_by = self.refs(entity, actors);
        }
        (!event.is_empty()).then_some(event)
    }
}

impl Mapper for WikidataMapper {
    fn transform(
        &self,
        raw: &RawRecord,
        entity_type: &str,
    ) -> Result<CanonicalRecord, SourceError> {
        let entity = select_entity(&raw.data, &raw.identifier).ok_or_else(|| {
            SourceError::Unmappable(format!("no entity for '{}' in payload", raw.identifier))
        })?;

        let qid = entity
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(raw.identifier.as_str());
        let classes = claim_ids(entity, INSTANCE_OF);
        let record_type = classify(&classes, entity_type);
        let labels = entity.get("labels").and_then(Value::as_object);
        let label = labels
            .and_then(|l| l.get("en"))
            .and_then(|l| l.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut record =
            CanonicalRecord::new(record_type, Some(format!("{}{}", self.namespace, qid)), label);
        record.identified_by = labels.map(names_from_labels).unwrap_or_default();
        record.referred_to_by = entity
            .get("descriptions")
            .and_then(Value::as_object)
            .map(statements_from_descriptions)
            .unwrap_or_default();
        record.classified_as = classes.iter().map(|qid| self.entity_ref(qid)).collect();
        record.member_of = self.refs(entity, MEMBER_OF);

        let parents = self.refs(entity, PART_OF);
        if !parents.is_empty() {
            record.part_of = Some(parents);
        }

        match record.kind() {
            EntityKind::Person => {
                record.born =
                    self.event(entity, "Birth", DATE_OF_BIRTH, Some(PLACE_OF_BIRTH), None);
                record.died =
                    self.event(entity, "Death", DATE_OF_DEATH, Some(PLACE_OF_DEATH), None);
            }
            EntityKind::Group => {
                record.formed_by = self.event(
                    entity,
                    "Formation",
                    INCEPTION,
                    Some(FORMATION_LOCATION),
                    Some(FOUNDED_BY),
                );
                record.dissolved_by = self.event(entity, "Dissolution", DISSOLVED, None, None);
            }
            EntityKind::Place => {
                if record.part_of.is_none() {
                    let located_in = self.refs(entity, LOCATED_IN);
                    if !located_in.is_empty() {
                        record.part_of = Some(located_in);
                    }
                }
                record.defined_by = claim_point(entity, COORDINATES).map(Value::String);
            }
            EntityKind::HumanMadeObject => {
                record.produced_by =
                    self.event(entity, "Production", INCEPTION, None, Some(CREATOR));
                record.made_of = self.refs(entity, MATERIAL);
            }
            EntityKind::LinguisticObject | EntityKind::VisualItem => {
                record.about = self.refs(entity, MAIN_SUBJECT);
            }
            EntityKind::Other => {}
        }

        Ok(record)
    }
}

/// The entity for `identifier`, or the only one when Wikidata followed a redirect
fn select_entity<'a>(data: &'a Value, identifier: &str) -> Option<&'a Value> {
    let entities = data.get("entities").and_then(Value::as_object)?;
    entities
        .get(identifier)
        .or_else(|| entities.values().next())
}

fn any_of(classes: &[String], table: &[&str]) -> bool {
    classes.iter().any(|c| table.contains(&c.as_str()))
}

fn classify(classes: &[String], hint: &str) -> &'static str {
    if classes.iter().any(|c| c == HUMAN) {
        "Person"
    } else if any_of(classes, GROUP_CLASSES) {
        "Group"
    } else if any_of(classes, PLACE_CLASSES) {
        "Place"
    } else if any_of(classes, OBJECT_CLASSES) {
        "HumanMadeObject"
    } else {
        match EntityKind::from_type_name(hint) {
            EntityKind::Person => "Person",
            EntityKind::Group => "Group",
            EntityKind::Place => "Place",
            EntityKind::HumanMadeObject => "HumanMadeObject",
            EntityKind::LinguisticObject => "LinguisticObject",
            EntityKind::VisualItem => "VisualItem",
            EntityKind::Other => "Type",
        }
    }
}

fn language_ref(code: &str) -> EntityRef {
    EntityRef {
        entity_type: Some("Language".to_string()),
        label: Some(code.to_string()),
        ..EntityRef::default()
    }
}

/// One Name per distinct label value, declaring every language that uses it.
/// The English label is the primary name.
fn names_from_labels(labels: &Map<String, Value>) -> Vec<Statement> {
    let english = labels
        .get("en")
        .and_then(|l| l.get("value"))
        .and_then(Value::as_str);

    let mut names: Vec<Statement> = Vec::new();
    for (code, label) in labels {
        let Some(value) = label.get("value").and_then(Value::as_str) else {
            continue;
        };
        match names.iter_mut().find(|n| n.content.as_deref() == Some(value)) {
            Some(name) => name.languages.push(language_ref(code)),
            None => {
                let name = if Some(value) == english {
                    Statement::primary_name(value)
                } else {
                    Statement::name(value)
                };
                names.push(name.with_language(language_ref(code)));
            }
        }
    }
    names
}

/// Descriptions as statements, English first
fn statements_from_descriptions(descriptions: &Map<String, Value>) -> Vec<Statement> {
    let mut entries: Vec<(&String, &str)> = descriptions
        .iter()
        .filter_map(|(code, d)| d.get("value").and_then(Value::as_str).map(|v| (code, v)))
        .collect();
    entries.sort_by_key(|(code, _)| code.as_str() != "en");
    entries
        .into_iter()
        .map(|(code, value)| Statement::text(value).with_language(language_ref(code)))
        .collect()
}

fn claim_values<'a>(entity: &'a Value, property: &str) -> impl Iterator<Item = &'a Value> {
    entity
        .get("claims")
        .and_then(|c| c.get(property))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|claim| claim.get("mainsnak")?.get("datavalue")?.get("value"))
}

fn claim_ids(entity: &Value, property: &str) -> Vec<String> {
    claim_values(entity, property)
        .filter_map(|v| v.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn claim_time(entity: &Value, property: &str) -> Option<String> {
    claim_values(entity, property)
        .find_map(|v| v.get("time").and_then(Value::as_str))
        .map(normalize_time)
}

fn claim_point(entity: &Value, property: &str) -> Option<String> {
    claim_values(entity, property).find_map(|v| {
        let latitude = v.get("latitude")?.as_f64()?;
        let longitude = v.get("longitude")?.as_f64()?;
        Some(format!("POINT({} {})", longitude, latitude))
    })
}

/// "+1840-11-14T00:00:00Z" -> "1840-11-14T00:00:00"; unknown month/day become 01
pub fn normalize_time(time: &str) -> String {
    let time = time.trim_start_matches('+').trim_end_matches('Z');
    time.replacen("-00-00T", "-01-01T", 1).replacen("-00T", "-01T", 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linked_art_types::PRIMARY_NAME;
    use serde_json::json;

    const NS: &str = "http://www.wikidata.org/entity/";

    fn item(value: Value) -> Value {
        json!({"mainsnak": {"datavalue": {"value": value}}})
    }

    fn monet() -> RawRecord {
        RawRecord::new(
            json!({"entities": {"Q296": {
                "id": "Q296",
                "labels": {
                    "de": {"language": "de", "value": "Claude Monet"},
                    "en": {"language": "en", "value": "Claude Monet"},
                    "ru": {"language": "ru", "value": "Клод Моне"}
                },
                "descriptions": {
                    "fr": {"language": "fr", "value": "peintre français"},
                    "en": {"language": "en", "value": "French painter (1840-1926)"}
                },
                "claims": {
                    "P31": [item(json!({"id": "Q5"}))],
                    "P569": [item(json!({"time": "+1840-11-14T00:00:00Z", "precision": 11}))],
                    "P19": [item(json!({"id": "Q90"}))],
                    "P570": [item(json!({"time": "+1926-12-05T00:00:00Z"}))],
                    "P20": [item(json!({"id": "Q212420"}))]
                }
            }}}),
            "Q296",
            "wikidata",
        )
    }

    #[test]
    fn test_person_mapping() {
        let record = WikidataMapper::new(NS).transform(&monet(), "").unwrap();
        assert_eq!(record.record_type, "Person");
        assert_eq!(record.id.as_deref(), Some("http://www.wikidata.org/entity/Q296"));

        // identical labels collapse into one Name carrying both languages
        assert_eq!(record.identified_by.len(), 2);
        let primary = &record.identified_by[0];
        assert_eq!(primary.content.as_deref(), Some("Claude Monet"));
        assert_eq!(primary.languages.len(), 2);
        assert!(primary.classifications[0].denotes(PRIMARY_NAME));

        assert_eq!(
            record.referred_to_by[0].content.as_deref(),
            Some("French painter (1840-1926)")
        );

        let born = record.born.unwrap();
        assert_eq!(born.begin(), Some("1840-11-14T00:00:00"));
        assert_eq!(
            born.took_place_at[0].id.as_deref(),
            Some("http://www.wikidata.org/entity/Q90")
        );
        assert!(record.died.is_some());
        assert_eq!(record.classified_as.len(), 1);
    }

    #[test]
    fn test_place_mapping_with_coordinates() {
        let raw = RawRecord::new(
            json!({"entities": {"Q90": {
                "id": "Q90",
                "labels": {"en": {"language": "en", "value": "Paris"}},
                "claims": {
                    "P31": [item(json!({"id": "Q5119"}))],
                    "P131": [item(json!({"id": "Q13917"}))],
                    "P625": [item(json!({"latitude": 48.856, "longitude": 2.352}))]
                }
            }}}),
            "Q90",
            "wikidata",
        );
        let record = WikidataMapper::new(NS).transform(&raw, "").unwrap();
        assert_eq!(record.record_type, "Place");
        assert_eq!(record.defined_by, Some(json!("POINT(2.352 48.856)")));
        assert_eq!(record.parents().len(), 1);
    }

    #[test]
    fn test_unknown_class_uses_hint() {
        let raw = RawRecord::new(
            json!({"entities": {"Q1": {"id": "Q1", "labels": {}}}}),
            "Q1",
            "wikidata",
        );
        let mapper = WikidataMapper::new(NS);
        assert_eq!(mapper.transform(&raw, "Group").unwrap().record_type, "Group");
        assert_eq!(mapper.transform(&raw, "").unwrap().record_type, "Type");
    }

    #[test]
    fn test_redirected_entity() {
        let raw = RawRecord::new(
            json!({"entities": {"Q2": {"id": "Q2", "labels": {"en": {"value": "Earth"}}}}}),
            "Q_OLD",
            "wikidata",
        );
        let record = WikidataMapper::new(NS).transform(&raw, "").unwrap();
        assert_eq!(record.label.as_deref(), Some("Earth"));
    }

    #[test]
    fn test_missing_entities_is_unmappable() {
        let raw = RawRecord::new(json!({"error": "no-such-entity"}), "Q0", "wikidata");
        assert!(WikidataMapper::new(NS).transform(&raw, "").is_err());
    }

    #[test]
    fn test_parse_search_response_dedupes() {
        let response = json!({"search": [
            {"id": "Q296", "label": "Claude Monet"},
            {"id": "Q1", "label": "x"},
            {"id": "Q296", "label": "Monet"}
        ]});
        assert_eq!(parse_search_response(&response), vec!["Q296", "Q1"]);
        assert!(parse_search_response(&json!({})).is_empty());
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("+1840-11-14T00:00:00Z"), "1840-11-14T00:00:00");
        assert_eq!(normalize_time("+1500-00-00T00:00:00Z"), "1500-01-01T00:00:00");
        assert_eq!(normalize_time("-0300-00-00T00:00:00Z"), "-0300-01-01T00:00:00");
    }
}
