//! Canonical record shape produced by every dataset mapper
//!
//! A deliberately small subset of the Linked Art JSON-LD profile: only the
//! properties the normalizer reads are modelled, everything else in a payload
//! is ignored on deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// AAT "preferred terms" classification marking the primary name of an entity.
pub const PRIMARY_NAME: &str = "http://vocab.getty.edu/aat/300404670";

// ============================================================================
// ENTITY KINDS
// ============================================================================

/// Linked Art classes the normalizer has extraction rules for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Group,
    Place,
    HumanMadeObject,
    LinguisticObject,
    VisualItem,
    /// Any other class (Type, Material, Set, Activity, ...)
    Other,
}

impl EntityKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "Person" => Self::Person,
            "Group" => Self::Group,
            "Place" => Self::Place,
            "HumanMadeObject" => Self::HumanMadeObject,
            "LinguisticObject" => Self::LinguisticObject,
            "VisualItem" => Self::VisualItem,
            _ => Self::Other,
        }
    }
}

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

/// A pointer to another entity, optionally with a label and equivalents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(rename = "_label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub equivalent: Vec<EntityRef>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn typed(id: impl Into<String>, entity_type: &str, label: Option<String>) -> Self {
        Self {
            id: Some(id.into()),
            entity_type: Some(entity_type.to_string()),
            label,
            equivalent: Vec::new(),
        }
    }

    /// True when this reference, or one of its equivalents, denotes `uri`
    pub fn denotes(&self, uri: &str) -> bool {
        self.id.as_deref() == Some(uri) || self.equivalent.iter().any(|e| e.denotes(uri))
    }

    /// True when this (language) reference stands for `code`.
    ///
    /// Accepts a bare code carried in the label ("en"), an id ending in the
    /// code, or an exact id match, including through equivalents.
    pub fn matches_language(&self, code: &str) -> bool {
        if self.label.as_deref() == Some(code) {
            return true;
        }
        if let Some(id) = self.id.as_deref() {
            if id == code || id.rsplit('/').next() == Some(code) {
                return true;
            }
        }
        self.equivalent.iter().any(|e| e.matches_language(code))
    }
}

/// A linguistic statement: a Name, an Identifier, or a free-text description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub statement_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        rename = "language",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub languages: Vec<EntityRef>,
    #[serde(
        rename = "classified_as",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub classifications: Vec<EntityRef>,
}

impl Statement {
    pub fn name(content: impl Into<String>) -> Self {
        Self {
            statement_type: Some("Name".to_string()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn primary_name(content: impl Into<String>) -> Self {
        let mut name = Self::name(content);
        name.classifications.push(EntityRef::new(PRIMARY_NAME));
        name
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            statement_type: Some("LinguisticObject".to_string()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: EntityRef) -> Self {
        self.languages.push(language);
        self
    }

    pub fn with_classification(mut self, classification: EntityRef) -> Self {
        self.classifications.push(classification);
        self
    }

    pub fn is_name(&self) -> bool {
        self.statement_type.as_deref() == Some("Name")
    }

    pub fn declares_language(&self, code: &str) -> bool {
        self.languages.iter().any(|l| l.matches_language(code))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_of_the_begin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_the_end: Option<String>,
}

/// Birth, death, formation, production, encounter, ...
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timespan: Option<TimeSpan>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub took_place_at: Vec<EntityRef>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub carried_out_by: Vec<EntityRef>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub part: Vec<Event>,
}

impl Event {
    pub fn of_type(event_type: &str) -> Self {
        Self {
            event_type: Some(event_type.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timespan.is_none()
            && self.took_place_at.is_empty()
            && self.carried_out_by.is_empty()
            && self.part.is_empty()
    }

    pub fn begin(&self) -> Option<&str> {
        self.timespan.as_ref()?.begin_of_the_begin.as_deref()
    }

    /// Begin of the timespan, falling back to its end
    pub fn begin_or_end(&self) -> Option<&str> {
        let ts = self.timespan.as_ref()?;
        ts.begin_of_the_begin
            .as_deref()
            .or(ts.end_of_the_end.as_deref())
    }
}

// ============================================================================
// CANONICAL RECORD
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(rename = "_label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub identified_by: Vec<Statement>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub referred_to_by: Vec<Statement>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub classified_as: Vec<EntityRef>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub equivalent: Vec<EntityRef>,

    // Presence matters here: a record with `part_of` never falls back to `broader`.
    #[serde(default, deserialize_with = "opt_one_or_many", skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Vec<EntityRef>>,
    #[serde(default, deserialize_with = "opt_one_or_many", skip_serializing_if = "Option::is_none")]
    pub broader: Option<Vec<EntityRef>>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub member_of: Vec<EntityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub born: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub died: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formed_by: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissolved_by: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced_by: Option<Event>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub encountered_by: Vec<Event>,

    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub made_of: Vec<EntityRef>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub carries: Vec<EntityRef>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub shows: Vec<EntityRef>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub about: Vec<EntityRef>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub represents: Vec<EntityRef>,

    /// Raw geometry (WKT or GeoJSON), passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_by: Option<serde_json::Value>,
}

impl CanonicalRecord {
    pub fn new(record_type: &str, id: Option<String>, label: Option<String>) -> Self {
        Self {
            id,
            record_type: record_type.to_string(),
            label,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> EntityKind {
        EntityKind::from_type_name(&self.record_type)
    }

    /// Parents: `part_of` when present, otherwise `broader`
    pub fn parents(&self) -> &[EntityRef] {
        self.part_of
            .as_deref()
            .or(self.broader.as_deref())
            .unwrap_or(&[])
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<OneOrMany<T>>::deserialize(deserializer)?
        .map(Vec::from)
        .unwrap_or_default())
}

fn opt_one_or_many<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<OneOrMany<T>>::deserialize(deserializer)?.map(Vec::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_linked_art_person() {
        let payload = json!({
            "@context": "https://linked.art/ns/v1/linked-art.json",
            "id": "http://vocab.getty.edu/ulan/500019484",
            "type": "Person",
            "_label": "Monet, Claude",
            "identified_by": [
                {
                    "type": "Name",
                    "content": "Claude Monet",
                    "classified_as": [{"id": PRIMARY_NAME, "type": "Type"}]
                },
                {"type": "Identifier", "content": "500019484"}
            ],
            "born": {
                "type": "Birth",
                "timespan": {"begin_of_the_begin": "1840-11-14T00:00:00"},
                "took_place_at": [{"id": "http://vocab.getty.edu/tgn/7008038", "type": "Place"}]
            },
            "member_of": {"id": "http://vocab.getty.edu/ulan/500000001"},
            "dimension": [{"type": "Dimension", "value": 3}]
        });

        let record: CanonicalRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.kind(), EntityKind::Person);
        assert_eq!(record.identified_by.len(), 2);
        assert!(record.identified_by[0].is_name());
        assert!(!record.identified_by[1].is_name());
        assert_eq!(record.born.as_ref().unwrap().begin(), Some("1840-11-14T00:00:00"));
        // single object accepted where an array is expected
        assert_eq!(record.member_of.len(), 1);
    }

    #[test]
    fn test_parents_prefers_part_of() {
        let record: CanonicalRecord = serde_json::from_value(json!({
            "type": "Place",
            "part_of": [{"id": "a"}],
            "broader": [{"id": "b"}]
        }))
        .unwrap();
        assert_eq!(record.parents()[0].id.as_deref(), Some("a"));

        let record: CanonicalRecord = serde_json::from_value(json!({
            "type": "Type",
            "broader": [{"id": "b"}]
        }))
        .unwrap();
        assert_eq!(record.parents()[0].id.as_deref(), Some("b"));

        let record: CanonicalRecord = serde_json::from_value(json!({
            "type": "Type",
            "part_of": [],
            "broader": [{"id": "b"}]
        }))
        .unwrap();
        assert!(record.parents().is_empty());
    }

    #[test]
    fn test_begin_or_end() {
        let event = Event {
            timespan: Some(TimeSpan {
                begin_of_the_begin: None,
                end_of_the_end: Some("1873-12-31T23:59:59".to_string()),
            }),
            ..Event::default()
        };
        assert_eq!(event.begin(), None);
        assert_eq!(event.begin_or_end(), Some("1873-12-31T23:59:59"));
        assert!(!event.is_empty());
        assert!(Event::of_type("Production").is_empty());
    }

    #[test]
    fn test_denotes_through_equivalent() {
        let cxn = EntityRef {
            id: Some("https://example.org/primary".to_string()),
            equivalent: vec![EntityRef::new(PRIMARY_NAME)],
            ..EntityRef::default()
        };
        assert!(cxn.denotes(PRIMARY_NAME));
        assert!(!EntityRef::new("x").denotes(PRIMARY_NAME));
    }

    #[test]
    fn test_matches_language() {
        let by_label = EntityRef {
            label: Some("en".to_string()),
            ..EntityRef::default()
        };
        assert!(by_label.matches_language("en"));
        assert!(EntityRef::new("http://vocab.getty.edu/aat/300388277")
            .matches_language("http://vocab.getty.edu/aat/300388277"));
        assert!(EntityRef::new("https://id.loc.gov/vocabulary/iso639-1/fr").matches_language("fr"));
        assert!(!by_label.matches_language("fr"));
    }
}
