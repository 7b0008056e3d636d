//! Response envelopes for the search and fetch operations

use serde::Serialize;

use crate::simplified::SimplifiedRecord;

/// Result of `search_by_name`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<SimplifiedRecord>,
}

/// Result of `get_by_id`; `candidate` is null when the record could not be resolved
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateResponse {
    pub candidate: Option<SimplifiedRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub datasets: Vec<String>,
    pub cache_entries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_candidate_is_null() {
        let value = serde_json::to_value(CandidateResponse::default()).unwrap();
        assert_eq!(value, serde_json::json!({"candidate": null}));
    }
}
