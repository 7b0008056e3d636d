//! Simplified records: the flattened projection handed to API consumers

use serde::{Deserialize, Serialize};

/// Minimal pointer to an entity
///
/// `id` is always the local identifier within `dataset` (or within the
/// dataset of the enclosing record when `dataset` is absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    /// Set only when the entity was resolved in another dataset than its referrer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
}

impl Reference {
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            name: name.into(),
            dataset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Description {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Reference>,
}

/// Flattened record: reference fields, shared relations, then per-type fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifiedRecord {
    #[serde(flatten)]
    pub reference: Reference,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<Description>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub part_of: Vec<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub member_of: Vec<Reference>,
    #[serde(flatten)]
    pub details: Option<Details>,
}

impl SimplifiedRecord {
    pub fn new(reference: Reference) -> Self {
        Self {
            reference,
            classifications: Vec::new(),
            descriptions: Vec::new(),
            part_of: Vec::new(),
            member_of: Vec::new(),
            details: None,
        }
    }

    pub fn person(&self) -> Option<&PersonFields> {
        match &self.details {
            Some(Details::Person(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn group(&self) -> Option<&GroupFields> {
        match &self.details {
            Some(Details::Group(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn place(&self) -> Option<&PlaceFields> {
        match &self.details {
            Some(Details::Place(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn object(&self) -> Option<&ObjectFields> {
        match &self.details {
            Some(Details::Object(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn work(&self) -> Option<&WorkFields> {
        match &self.details {
            Some(Details::Work(fields)) => Some(fields),
            _ => None,
        }
    }
}

/// Fields derived from the record's type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Details {
    Person(PersonFields),
    Group(GroupFields),
    Place(PlaceFields),
    Object(ObjectFields),
    /// LinguisticObject and VisualItem
    Work(WorkFields),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_place: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founding_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founding_place: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub founder: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dissolution_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dissolution_place: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dissolver: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaceFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_place: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creator: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_place: Option<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discoverer: Vec<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub material: Vec<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub carries: Vec<SimplifiedRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shows: Vec<SimplifiedRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkFields {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub about: Vec<Reference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub represents: Vec<Reference>,
}
