// ── Establishment (school) ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::kind::{EntityKind, Record};
use crate::store::Snapshot;

/// A school served by the transport service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Establishment {
    pub id: EntityId,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Record for Establishment {
    const KIND: EntityKind = EntityKind::Establishment;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.establishments
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.establishments)
    }
}
