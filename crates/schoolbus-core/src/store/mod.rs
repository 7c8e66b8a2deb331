// ── Snapshot store ──

mod data_store;
pub mod demo;
mod snapshot;

pub use data_store::DataStore;
pub use snapshot::Snapshot;
