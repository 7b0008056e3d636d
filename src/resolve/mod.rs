//! Record resolution: name selection, memoization, normalization

pub mod cache;
mod extract;
pub mod names;
pub mod normalizer;

pub use cache::{NoCache, Outcome, ReferenceCache, ResolveKey, ResolvedEntry, SingleFlightCache};
pub use names::select_primary_name;
pub use normalizer::RecordNormalizer;
