//! Primary name selection

use linked_art_types::{Statement, PRIMARY_NAME};

/// Pick the display name among a record's `identified_by` statements.
///
/// Only Name statements with content are candidates. The first one classified
/// as the primary name wins; otherwise the one declaring the most languages,
/// earliest on ties.
pub fn select_primary_name(identified_by: &[Statement]) -> Option<&Statement> {
    let candidates = identified_by
        .iter()
        .filter(|s| s.is_name() && s.content.as_deref().is_some_and(|c| !c.is_empty()));

    let mut best: Option<&Statement> = None;
    for name in candidates {
        if name.classifications.iter().any(|c| c.denotes(PRIMARY_NAME)) {
            return Some(name);
        }
        if best.map_or(true, |b| name.languages.len() > b.languages.len()) {
            best = Some(name);
        }
    }
    best
}
