// ── Fleet: buses and the drivers assigned to them ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::kind::{EntityKind, Record};
use crate::store::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: EntityId,
    pub plate_number: String,
    pub make: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub capacity: u32,
    #[serde(default)]
    pub establishment_id: Option<EntityId>,
    #[serde(default)]
    pub driver_id: Option<EntityId>,
}

impl Record for Bus {
    const KIND: EntityKind = EntityKind::Bus;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.buses
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.buses)
    }
}

/// A user with the driver role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default)]
    pub establishment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Driver {
    const KIND: EntityKind = EntityKind::Driver;

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
        &snapshot.drivers
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.drivers)
    }
}
