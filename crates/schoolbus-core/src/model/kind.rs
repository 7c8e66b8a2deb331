// ── Entity kinds and per-kind configuration ──
//
// Every per-kind constant the pipeline needs (API resource path, delete
// policy, display label) is declared here, once.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use crate::store::Snapshot;

/// How a record disappears when deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeletePolicy {
    /// Removed from its collection; foreign keys pointing at it are nulled.
    Hard,
    /// Flagged with `deletedAt` and hidden from derivation; link rows
    /// pointing at it are removed.
    Soft,
}

/// The record types managed by the admin pages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EntityKind {
    Establishment,
    Bus,
    Driver,
    Parent,
    Student,
    Route,
    Trip,
}

impl EntityKind {
    /// Delete policy, fixed per kind.
    pub const fn delete_policy(self) -> DeletePolicy {
        match self {
            Self::Parent | Self::Student | Self::Driver => DeletePolicy::Soft,
            Self::Establishment | Self::Bus | Self::Route | Self::Trip => DeletePolicy::Hard,
        }
    }

    /// REST resource path on the backend.
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Establishment => "establishments",
            Self::Bus => "buses",
            Self::Driver => "drivers",
            Self::Parent => "parents",
            Self::Student => "students",
            Self::Route => "routes",
            Self::Trip => "trips",
        }
    }

    /// Human-readable singular label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Establishment => "establishment",
            Self::Bus => "bus",
            Self::Driver => "driver",
            Self::Parent => "parent",
            Self::Student => "student",
            Self::Route => "route",
            Self::Trip => "trip",
        }
    }
}

/// Resource path of the parent ↔ student link table.
pub const PARENT_STUDENT_RESOURCE: &str = "parent-students";

/// A raw persisted record.
///
/// `collection` / `collection_mut` bind each type to its slot in the
/// [`Snapshot`], which lets the store and the mutation gateway stay generic.
pub trait Record:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Deletion marker. Always `None` for hard-deleted kinds.
    fn deleted_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        None
    }

    /// Set the deletion marker. Only called for [`DeletePolicy::Soft`] kinds.
    fn mark_deleted(&mut self, _at: chrono::DateTime<chrono::Utc>) {}

    fn is_active(&self) -> bool {
        self.deleted_at().is_none()
    }

    fn collection(snapshot: &Snapshot) -> &[Self];

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}
