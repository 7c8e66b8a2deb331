// ── Enricher ──
//
// Joins each raw record with its sibling collections. A foreign key that
// resolves to nothing (missing or soft-deleted) becomes a fixed sentinel
// string, so the text filter treats it like any other value.

use std::borrow::Cow;

use serde::Serialize;

use super::filter::Searchable;
use crate::model::{
    Bus, Driver, EntityId, Establishment, Parent, Record, Route, Student, Trip,
};
use crate::store::Snapshot;

/// Placeholder for an unresolved single relation.
pub const UNASSIGNED: &str = "Non attribué";
/// Placeholder for a parent with no linked students.
pub const NO_STUDENTS: &str = "Aucun élève associé";
/// Placeholder for a student with no linked parents.
pub const NO_PARENTS: &str = "Aucun parent associé";

/// A record type with a denormalized view.
pub trait Enrich: Record {
    type View: Clone + std::fmt::Debug + Serialize + Searchable + Send + Sync + 'static;

    fn enrich(&self, snapshot: &Snapshot) -> Self::View;
}

// ── Lookup helpers ───────────────────────────────────────────────────

fn establishment_name(snapshot: &Snapshot, id: Option<EntityId>) -> String {
    snapshot
        .resolve::<Establishment>(id)
        .map_or_else(|| UNASSIGNED.to_owned(), |e| e.name.clone())
}

fn driver_name(snapshot: &Snapshot, id: Option<EntityId>) -> String {
    snapshot
        .resolve::<Driver>(id)
        .map_or_else(|| UNASSIGNED.to_owned(), Driver::full_name)
}

fn or_sentinel(names: Vec<String>, sentinel: &str) -> String {
    if names.is_empty() {
        sentinel.to_owned()
    } else {
        names.join(", ")
    }
}

// ── Establishment ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentView {
    #[serde(flatten)]
    pub establishment: Establishment,
    pub bus_count: usize,
    pub student_count: usize,
}

impl Enrich for Establishment {
    type View = EstablishmentView;

    fn enrich(&self, snapshot: &Snapshot) -> EstablishmentView {
        let here = Some(self.id);
        EstablishmentView {
            establishment: self.clone(),
            bus_count: snapshot
                .active::<Bus>()
                .filter(|b| b.establishment_id == here)
                .count(),
            student_count: snapshot
                .active::<Student>()
                .filter(|s| s.establishment_id == here)
                .count(),
        }
    }
}

impl Searchable for EstablishmentView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.establishment.id == id
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let e = &self.establishment;
        vec![
            Cow::Borrowed(e.name.as_str()),
            Cow::Borrowed(e.address.as_str()),
            Cow::Borrowed(e.city.as_str()),
        ]
    }
}

// ── Bus ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusView {
    #[serde(flatten)]
    pub bus: Bus,
    pub establishment_name: String,
    pub driver_name: String,
}

impl Enrich for Bus {
    type View = BusView;

    fn enrich(&self, snapshot: &Snapshot) -> BusView {
        BusView {
            bus: self.clone(),
            establishment_name: establishment_name(snapshot, self.establishment_id),
            driver_name: driver_name(snapshot, self.driver_id),
        }
    }
}

impl Searchable for BusView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.bus.establishment_id == Some(id)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.bus.plate_number.as_str()),
            Cow::Borrowed(self.bus.make.as_str()),
            Cow::Borrowed(self.establishment_name.as_str()),
            Cow::Owned(self.bus.capacity.to_string()),
        ]
    }
}

// ── Driver ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverView {
    #[serde(flatten)]
    pub driver: Driver,
    pub establishment_name: String,
    /// Plate of the first bus assigned to this driver.
    pub bus_plate: String,
}

impl Enrich for Driver {
    type View = DriverView;

    fn enrich(&self, snapshot: &Snapshot) -> DriverView {
        DriverView {
            driver: self.clone(),
            establishment_name: establishment_name(snapshot, self.establishment_id),
            bus_plate: snapshot
                .active::<Bus>()
                .find(|b| b.driver_id == Some(self.id))
                .map_or_else(|| UNASSIGNED.to_owned(), |b| b.plate_number.clone()),
        }
    }
}

impl Searchable for DriverView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.driver.establishment_id == Some(id)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let d = &self.driver;
        let mut fields = vec![
            Cow::Borrowed(d.first_name.as_str()),
            Cow::Borrowed(d.last_name.as_str()),
            Cow::Borrowed(d.email.as_str()),
            Cow::Borrowed(self.establishment_name.as_str()),
        ];
        if let Some(license) = &d.license_number {
            fields.push(Cow::Borrowed(license.as_str()));
        }
        fields
    }
}

// ── Parent ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentView {
    #[serde(flatten)]
    pub parent: Parent,
    /// Linked students, in link-table order.
    pub student_ids: Vec<EntityId>,
    pub student_names: String,
    /// Establishments of the linked students; drives the categorical filter.
    #[serde(skip)]
    pub establishment_ids: Vec<EntityId>,
}

impl Enrich for Parent {
    type View = ParentView;

    fn enrich(&self, snapshot: &Snapshot) -> ParentView {
        let students: Vec<&Student> = snapshot
            .links_of_parent(self.id)
            .filter_map(|link| snapshot.find::<Student>(link.student_id))
            .collect();

        ParentView {
            parent: self.clone(),
            student_ids: students.iter().map(|s| s.id).collect(),
            student_names: or_sentinel(
                students.iter().map(|s| s.full_name()).collect(),
                NO_STUDENTS,
            ),
            establishment_ids: students.iter().filter_map(|s| s.establishment_id).collect(),
        }
    }
}

impl Searchable for ParentView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.establishment_ids.contains(&id)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let p = &self.parent;
        let mut fields = vec![
            Cow::Borrowed(p.first_name.as_str()),
            Cow::Borrowed(p.last_name.as_str()),
            Cow::Borrowed(p.email.as_str()),
            Cow::Borrowed(self.student_names.as_str()),
        ];
        if let Some(phone) = &p.phone {
            fields.push(Cow::Borrowed(phone.as_str()));
        }
        fields
    }
}

// ── Student ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    #[serde(flatten)]
    pub student: Student,
    pub establishment_name: String,
    pub route_name: String,
    pub parent_names: String,
}

impl Enrich for Student {
    type View = StudentView;

    fn enrich(&self, snapshot: &Snapshot) -> StudentView {
        let parents = snapshot
            .links_of_student(self.id)
            .filter_map(|link| snapshot.find::<Parent>(link.parent_id))
            .map(Parent::full_name)
            .collect();

        StudentView {
            student: self.clone(),
            establishment_name: establishment_name(snapshot, self.establishment_id),
            route_name: snapshot
                .resolve::<Route>(self.route_id)
                .map_or_else(|| UNASSIGNED.to_owned(), |r| r.name.clone()),
            parent_names: or_sentinel(parents, NO_PARENTS),
        }
    }
}

impl Searchable for StudentView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.student.establishment_id == Some(id)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let s = &self.student;
        let mut fields = vec![
            Cow::Borrowed(s.first_name.as_str()),
            Cow::Borrowed(s.last_name.as_str()),
            Cow::Borrowed(self.establishment_name.as_str()),
            Cow::Borrowed(self.parent_names.as_str()),
        ];
        if let Some(grade) = &s.grade {
            fields.push(Cow::Borrowed(grade.as_str()));
        }
        fields
    }
}

// ── Route ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteView {
    #[serde(flatten)]
    pub route: Route,
    pub establishment_name: String,
    pub student_count: usize,
}

impl Enrich for Route {
    type View = RouteView;

    fn enrich(&self, snapshot: &Snapshot) -> RouteView {
        RouteView {
            route: self.clone(),
            establishment_name: establishment_name(snapshot, self.establishment_id),
            student_count: snapshot
                .active::<Student>()
                .filter(|s| s.route_id == Some(self.id))
                .count(),
        }
    }
}

impl Searchable for RouteView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.route.establishment_id == Some(id)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![
            Cow::Borrowed(self.route.name.as_str()),
            Cow::Borrowed(self.establishment_name.as_str()),
        ];
        fields.extend(self.route.stops.iter().map(|s| Cow::Borrowed(s.as_str())));
        fields
    }
}

// ── Trip ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripView {
    #[serde(flatten)]
    pub trip: Trip,
    pub route_name: String,
    pub bus_plate: String,
    pub driver_name: String,
    /// Establishment of the trip's route.
    #[serde(skip)]
    pub establishment_id: Option<EntityId>,
}

impl Enrich for Trip {
    type View = TripView;

    fn enrich(&self, snapshot: &Snapshot) -> TripView {
        let route = snapshot.resolve::<Route>(self.route_id);
        TripView {
            trip: self.clone(),
            route_name: route.map_or_else(|| UNASSIGNED.to_owned(), |r| r.name.clone()),
            bus_plate: snapshot
                .resolve::<Bus>(self.bus_id)
                .map_or_else(|| UNASSIGNED.to_owned(), |b| b.plate_number.clone()),
            driver_name: driver_name(snapshot, self.driver_id),
            establishment_id: route.and_then(|r| r.establishment_id),
        }
    }
}

impl Searchable for TripView {
    fn in_establishment(&self, id: EntityId) -> bool {
        self.establishment_id == Some(id)
    }

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.route_name.as_str()),
            Cow::Borrowed(self.bus_plate.as_str()),
            Cow::Borrowed(self.driver_name.as_str()),
            Cow::Owned(self.trip.status.to_string()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::demo;
    use chrono::Utc;

    #[test]
    fn bus_with_dangling_establishment_gets_sentinel() {
        let snap = demo::snapshot();
        let mut bus = snap.buses[0].clone();
        bus.establishment_id = Some(EntityId::new(999));

        let first = bus.enrich(&snap);
        let second = bus.enrich(&snap);
        assert_eq!(first.establishment_name, UNASSIGNED);
        assert_eq!(first.establishment_name, second.establishment_name);
    }

    #[test]
    fn parent_student_names_follow_link_order() {
        let snap = demo::snapshot();
        let view = snap.parents[0].enrich(&snap);
        assert_eq!(view.student_names, "Amine Zahra, Salma Zahra");
        assert_eq!(view.student_ids, vec![EntityId::new(1), EntityId::new(2)]);
    }

    #[test]
    fn soft_deleted_students_do_not_resolve() {
        let mut snap = demo::snapshot();
        // Keep the link row so only the soft-delete marker hides the student.
        std::sync::Arc::make_mut(&mut snap.students)
            .iter_mut()
            .filter(|s| s.id == EntityId::new(6))
            .for_each(|s| s.deleted_at = Some(Utc::now()));

        let view = snap.parents[3].enrich(&snap);
        assert_eq!(view.student_names, NO_STUDENTS);
        assert!(view.student_ids.is_empty());
    }

    #[test]
    fn student_without_parents_gets_sentinel() {
        let snap = demo::snapshot();
        let lonely = snap
            .students
            .iter()
            .find(|s| snap.links_of_student(s.id).next().is_none())
            .unwrap();
        assert_eq!(lonely.enrich(&snap).parent_names, NO_PARENTS);
    }

    #[test]
    fn bus_view_serializes_flat() {
        let snap = demo::snapshot();
        let json = serde_json::to_value(snap.buses[0].enrich(&snap)).unwrap();
        assert_eq!(json["plateNumber"], "1234-A-6");
        assert_eq!(json["establishmentName"], "Collège Belorado");
        assert_eq!(json["driverName"], "Youssef Benali");
    }
}
