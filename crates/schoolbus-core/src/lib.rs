//! Collection engine for the school-bus administration pages.
//!
//! Every admin page (buses, parents, students, routes, establishments,
//! drivers, trips) runs the same pipeline over one authoritative
//! [`Snapshot`]:
//!
//! 1. a [`SourceLoader`] supplies raw records (local snapshot or REST backend),
//! 2. the Enricher joins sibling collections into view records,
//! 3. the Filter Chain applies the establishment selector, then text search,
//! 4. the Paginator clamps the page and slices it.
//!
//! Writes go through [`Controller::execute`], which validates the
//! [`Command`], applies it to a copy of the snapshot (or the backend) and
//! publishes the result wholesale.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod listing;
pub mod model;
pub mod notify;
pub mod source;
pub mod store;
pub mod stream;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────

pub use command::{Command, CommandResult};
pub use config::{Backend, ControllerConfig, DEFAULT_ITEMS_PER_PAGE, TlsVerification};
pub use controller::{Controller, MutationState};
pub use error::CoreError;
pub use listing::{ListView, Listing};
pub use notify::{AutoConfirm, Confirm, Notifier, TracingNotifier};
pub use source::{LoadedPage, LocalSource, PageRequest, RemoteSource, SourceLoader, Total};
pub use store::{DataStore, Snapshot};
pub use stream::{SnapshotStream, SnapshotWatchStream};
pub use view::{CategoryFilter, Derived, Enrich, FilterState, PageState, derive};

// Model re-exports.
pub use model::{
    Bus, DeletePolicy, Driver, EntityId, EntityKind, Establishment, Parent, ParentStudentLink,
    Record, Route, Student, Trip, TripDirection, TripStatus,
};
