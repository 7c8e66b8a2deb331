// ── Families: parents, students, and the link table between them ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::kind::{EntityKind, Record};
use crate::store::Snapshot;

/// A user with the parent role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Parent {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Parent {
    const KIND: EntityKind = EntityKind::Parent;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.parents
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.parents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default)]
    pub establishment_id: Option<EntityId>,
    #[serde(default)]
    pub route_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.students
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.students)
    }
}

/// One row of the parent ↔ student many-to-many table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentStudentLink {
    pub parent_id: EntityId,
    pub student_id: EntityId,
}

impl ParentStudentLink {
    pub const fn new(parent_id: EntityId, student_id: EntityId) -> Self {
        Self {
            parent_id,
            student_id,
        }
    }
}
