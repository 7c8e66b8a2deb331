// ── Routes and the daily trips run on them ──

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::entity_id::EntityId;
use super::kind::{EntityKind, Record};
use crate::store::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub establishment_id: Option<EntityId>,
    /// Ordered stop names.
    #[serde(default)]
    pub stops: Vec<String>,
}

impl Record for Route {
    const KIND: EntityKind = EntityKind::Route;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.routes
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.routes)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TripDirection {
    #[default]
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TripStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// One scheduled run of a route: the link between a route, a bus and a driver
/// on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: EntityId,
    #[serde(default)]
    pub route_id: Option<EntityId>,
    #[serde(default)]
    pub bus_id: Option<EntityId>,
    #[serde(default)]
    pub driver_id: Option<EntityId>,
    pub date: NaiveDate,
    pub departure_time: NaiveTime,
    #[serde(default)]
    pub direction: TripDirection,
    #[serde(default)]
    pub status: TripStatus,
}

impl Record for Trip {
    const KIND: EntityKind = EntityKind::Trip;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.trips
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
        std::sync::Arc::make_mut(&mut snapshot.trips)
    }
}
