//! Pleiades gazetteer: RSS title searcher and place JSON mapper

use async_trait::async_trait;
use linked_art_types::{CanonicalRecord, EntityRef, Statement};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use crate::error::SourceError;
use crate::sources::http::DatasetClient;
use crate::sources::traits::{Mapper, RawRecord, SearchRequest, Searcher};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://pleiades.stoa.org/search_rss";

// =============================================================================
// Searcher
// =============================================================================

pub struct PleiadesSearcher {
    endpoint: String,
    http: DatasetClient,
}

impl PleiadesSearcher {
    pub fn new(endpoint: Option<String>, http: DatasetClient) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            http,
        }
    }
}

#[async_trait]
impl Searcher for PleiadesSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SourceError> {
        let query = self.http.get(&self.endpoint).query(&[
            ("portal_type:list", "Place"),
            ("review_state:list", "published"),
            ("Title", request.query.as_str()),
        ]);
        let body = self.http.send_text(query).await?;
        parse_rss(&body)
    }
}

/// Resources listed in the channel's `rdf:Seq` (`rdf:li/@rdf:resource`)
pub fn parse_rss(xml: &str) -> Result<Vec<String>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut resources = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if e.local_name().as_ref() != b"li" {
                    continue;
                }
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"resource" {
                        resources.push(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(resources)
}

// =============================================================================
// Mapper
// =============================================================================

/// Builds Place records from `places/{id}/json`
pub struct PleiadesMapper {
    namespace: String,
}

impl PleiadesMapper {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Mapper for PleiadesMapper {
    fn transform(
        &self,
        raw: &RawRecord,
        _entity_type: &str,
    ) -> Result<CanonicalRecord, SourceError> {
        let data = &raw.data;
        let title = data
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SourceError::Unmappable(format!("place '{}' has no title", raw.identifier))
            })?;

        let id = format!("{}{}", self.namespace, raw.identifier);
        let mut record = CanonicalRecord::new("Place", Some(id), Some(title.to_string()));
        record.identified_by.push(Statement::primary_name(title));

        let names = data.get("names").and_then(Value::as_array);
        for name in names.into_iter().flatten() {
            let Some(romanized) = name.get("romanized").and_then(Value::as_str) else {
                continue;
            };
            // "Roma, Rome" lists spelling variants
            for variant in romanized.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                if record.identified_by.iter().any(|n| n.content.as_deref() == Some(variant)) {
                    continue;
                }
                let mut statement = Statement::name(variant);
                let lang = name
                    .get("language")
                    .and_then(Value::as_str)
                    .filter(|l| !l.is_empty());
                if let Some(lang) = lang {
                    statement = statement.with_language(EntityRef {
                        entity_type: Some("Language".to_string()),
                        label: Some(lang.to_string()),
                        ..EntityRef::default()
                    });
                }
                record.identified_by.push(statement);
            }
        }

        if let Some(description) = data.get("description").and_then(Value::as_str) {
            if !description.is_empty() {
                record.referred_to_by.push(Statement::text(description));
            }
        }

        record.defined_by = repr_point(data).map(Value::String);
        Ok(record)
    }
}

/// `reprPoint` is `[longitude, latitude]`
fn repr_point(data: &Value) -> Option<String> {
    let point = data.get("reprPoint")?.as_array()?;
    let longitude = point.first()?.as_f64()?;
    let latitude = point.get(1)?.as_f64()?;
    Some(format!("POINT({} {})", longitude, latitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RSS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://pleiades.stoa.org/search_rss">
    <title>Search results</title>
    <items>
      <rdf:Seq>
        <rdf:li rdf:resource="https://pleiades.stoa.org/places/295374"/>
        <rdf:li rdf:resource="https://pleiades.stoa.org/places/295375"/>
      </rdf:Seq>
    </items>
  </channel>
  <item rdf:about="https://pleiades.stoa.org/places/295374">
    <title>Zucchabar</title>
  </item>
</rdf:RDF>"#;

    #[test]
    fn test_parse_rss() {
        assert_eq!(
            parse_rss(RSS).unwrap(),
            vec![
                "https://pleiades.stoa.org/places/295374",
                "https://pleiades.stoa.org/places/295375"
            ]
        );
    }

    #[test]
    fn test_parse_empty_feed() {
        let xml = concat!(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">"#,
            "<channel/></rdf:RDF>"
        );
        assert!(parse_rss(xml).unwrap().is_empty());
    }

    #[test]
    fn test_place_mapping() {
        let raw = RawRecord::new(
            json!({
                "id": "423025",
                "title": "Roma",
                "description": "The capital of the Roman Empire.",
                "reprPoint": [12.486, 41.891],
                "names": [
                    {"romanized": "Roma, Rome", "language": "la"},
                    {"romanized": "Rhome", "language": ""}
                ]
            }),
            "423025",
            "pleiades",
        );
        let record = PleiadesMapper::new("https://pleiades.stoa.org/places/")
            .transform(&raw, "")
            .unwrap();
        assert_eq!(record.record_type, "Place");
        assert_eq!(record.id.as_deref(), Some("https://pleiades.stoa.org/places/423025"));
        let names: Vec<_> = record
            .identified_by
            .iter()
            .filter_map(|n| n.content.as_deref())
            .collect();
        assert_eq!(names, vec!["Roma", "Rome", "Rhome"]);
        assert!(record.identified_by[1].declares_language("la"));
        assert!(record.identified_by[2].languages.is_empty());
        assert_eq!(record.defined_by, Some(json!("POINT(12.486 41.891)")));
        assert_eq!(record.referred_to_by.len(), 1);
    }

    #[test]
    fn test_place_without_title_is_unmappable() {
        let raw = RawRecord::new(json!({"id": "1"}), "1", "pleiades");
        assert!(PleiadesMapper::new("ns/").transform(&raw, "").is_err());
    }
}
