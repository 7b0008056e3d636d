//! Shared record types for the Linked Art gateway
//!
//! This crate owns every shape that crosses a boundary of the gateway:
//!
//! ```text
//! ┌──────────────────┐  Mapper   ┌──────────────────┐  Normalizer  ┌──────────────────┐
//! │  Dataset payload │ ────────► │ CanonicalRecord  │ ───────────► │ SimplifiedRecord │
//! │  (any format)    │           │ (Linked Art)     │              │ (flat, by id)    │
//! └──────────────────┘           └──────────────────┘              └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Canonical types mirror Linked Art JSON keys (`identified_by`, `classified_as`, ...)
//! 2. Single values are accepted wherever Linked Art allows an array
//! 3. Simplified types serialize with the field names API consumers expect
//!    (`birthDate`, `part_of`, ...) and omit empty fields

pub mod api;
pub mod canonical;
pub mod simplified;

pub use api::{CandidateResponse, CandidatesResponse, HealthResponse};
pub use canonical::{
    CanonicalRecord, EntityKind, EntityRef, Event, Statement, TimeSpan, PRIMARY_NAME,
};
pub use simplified::{
    Description, Details, GroupFields, ObjectFields, PersonFields, PlaceFields, Reference,
    SimplifiedRecord, WorkFields,
};
