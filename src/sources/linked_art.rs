//! Mapper for datasets that already publish Linked Art (Getty vocabularies, LUX)

use linked_art_types::CanonicalRecord;

use crate::error::SourceError;
use crate::sources::traits::{Mapper, RawRecord};

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedArtMapper;

impl Mapper for LinkedArtMapper {
    fn transform(
        &self,
        raw: &RawRecord,
        entity_type: &str,
    ) -> Result<CanonicalRecord, SourceError> {
        if raw.data.get("type").and_then(|t| t.as_str()).is_none() {
            return Err(SourceError::Unmappable(format!(
                "'{}' from '{}' has no type",
                raw.identifier, raw.source
            )));
        }
        let record: CanonicalRecord = serde_json::from_value(raw.data.clone())
            .map_err(|e| SourceError::Unmappable(e.to_string()))?;

        if !entity_type.is_empty() && record.record_type != entity_type {
            tracing::debug!(
                dataset = %raw.source,
                identifier = %raw.identifier,
                expected = entity_type,
                actual = %record.record_type,
                "Record type differs from hint"
            );
        }
        Ok(record)
    }
}
