// ── Domain model ──
//
// Raw records as persisted by the backend (or the local dataset file).
// Derived display data lives in `crate::view`, never here.

pub mod entity_id;
pub mod establishment;
pub mod family;
pub mod fleet;
pub mod kind;
pub mod route;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use schoolbus_core::model::*` gives you everything.

pub use entity_id::EntityId;
pub use establishment::Establishment;
pub use family::{Parent, ParentStudentLink, Student};
pub use fleet::{Bus, Driver};
pub use kind::{DeletePolicy, EntityKind, PARENT_STUDENT_RESOURCE, Record};
pub use route::{Route, Trip, TripDirection, TripStatus};
