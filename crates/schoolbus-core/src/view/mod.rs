// ── Derivation pipeline: Enricher → Filter Chain → Paginator ──

mod derive;
mod enrich;
mod filter;
mod paginate;

pub use derive::{Derived, derive, derive_records};
pub use enrich::{
    BusView, DriverView, Enrich, EstablishmentView, NO_PARENTS, NO_STUDENTS, ParentView,
    RouteView, StudentView, TripView, UNASSIGNED,
};
pub use filter::{CategoryFilter, FilterState, Searchable, apply as apply_filter};
pub use paginate::{PageState, display_total_pages, page_slice, total_pages};
