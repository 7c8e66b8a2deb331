//! Async client for the school-bus administration REST backend.
//!
//! The backend is a plain JSON CRUD service. Every resource (buses,
//! parents, students, ...) answers the same four verbs:
//!
//! - `GET    /{resource}?page=&limit=&...` → `{ data: [...], pagination: { page, limit, totalPages } }`
//! - `POST   /{resource}`                 → created record
//! - `PUT    /{resource}/{id}`            → updated record
//! - `DELETE /{resource}/{id}`            → acknowledgement
//!
//! [`ApiClient`] is deliberately schema-agnostic: callers bring their own
//! `Serialize` / `DeserializeOwned` types. Domain modelling lives in
//! `schoolbus-core`.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{ListParams, Page, Pagination};
