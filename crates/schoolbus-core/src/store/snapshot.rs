// ── Snapshot: one coherent, immutable view of every collection ──
//
// Collections are `Arc<Vec<T>>`. A mutation clones the `Snapshot` (cheap:
// one refcount bump per collection) and `Arc::make_mut`s only the vectors
// it touches, so older snapshots and everything derived from them stay
// untouched.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{
    Bus, DeletePolicy, Driver, EntityId, EntityKind, Establishment, Parent, ParentStudentLink,
    Record, Route, Student, Trip,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub establishments: Arc<Vec<Establishment>>,
    #[serde(default)]
    pub buses: Arc<Vec<Bus>>,
    #[serde(default)]
    pub drivers: Arc<Vec<Driver>>,
    #[serde(default)]
    pub parents: Arc<Vec<Parent>>,
    #[serde(default)]
    pub students: Arc<Vec<Student>>,
    #[serde(default)]
    pub routes: Arc<Vec<Route>>,
    #[serde(default)]
    pub trips: Arc<Vec<Trip>>,
    #[serde(default)]
    pub parent_students: Arc<Vec<ParentStudentLink>>,
}

impl Snapshot {
    // ── Reads ────────────────────────────────────────────────────────

    /// Records of type `T` that are not soft-deleted, in collection order.
    pub fn active<T: Record>(&self) -> impl Iterator<Item = &T> {
        T::collection(self).iter().filter(|r| r.is_active())
    }

    /// Look up an active record. Soft-deleted records do not resolve.
    pub fn find<T: Record>(&self, id: EntityId) -> Option<&T> {
        T::collection(self)
            .iter()
            .find(|r| r.id() == id && r.is_active())
    }

    /// Resolve an optional foreign key to an active record.
    pub fn resolve<T: Record>(&self, id: Option<EntityId>) -> Option<&T> {
        id.and_then(|id| self.find::<T>(id))
    }

    /// Whether an active record of `kind` with `id` exists.
    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Establishment => self.find::<Establishment>(id).is_some(),
            EntityKind::Bus => self.find::<Bus>(id).is_some(),
            EntityKind::Driver => self.find::<Driver>(id).is_some(),
            EntityKind::Parent => self.find::<Parent>(id).is_some(),
            EntityKind::Student => self.find::<Student>(id).is_some(),
            EntityKind::Route => self.find::<Route>(id).is_some(),
            EntityKind::Trip => self.find::<Trip>(id).is_some(),
        }
    }

    pub fn count<T: Record>(&self) -> usize {
        self.active::<T>().count()
    }

    /// Link rows for one parent, in link-table order.
    pub fn links_of_parent(&self, parent_id: EntityId) -> impl Iterator<Item = &ParentStudentLink> {
        self.parent_students
            .iter()
            .filter(move |l| l.parent_id == parent_id)
    }

    /// Link rows for one student, in link-table order.
    pub fn links_of_student(
        &self,
        student_id: EntityId,
    ) -> impl Iterator<Item = &ParentStudentLink> {
        self.parent_students
            .iter()
            .filter(move |l| l.student_id == student_id)
    }

    /// Next local identity for `T`. Soft-deleted rows still hold their id.
    pub fn next_id<T: Record>(&self) -> EntityId {
        EntityId::next_after(T::collection(self).iter().map(Record::id))
    }

    // ── Writes (crate-internal; only the mutation gateway calls these) ──

    pub(crate) fn insert<T: Record>(&mut self, record: T) {
        T::collection_mut(self).push(record);
    }

    /// Replace the record with the same id, or append it.
    pub(crate) fn upsert<T: Record>(&mut self, record: T) {
        let items = T::collection_mut(self);
        match items.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => items.push(record),
        }
    }

    /// Apply `f` to an active record and return the updated copy.
    pub(crate) fn modify<T: Record>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut T),
    ) -> Result<T, CoreError> {
        if self.find::<T>(id).is_none() {
            return Err(CoreError::NotFound { kind: T::KIND, id });
        }
        let slot = T::collection_mut(self)
            .iter_mut()
            .find(|r| r.id() == id && r.is_active())
            .ok_or(CoreError::NotFound { kind: T::KIND, id })?;
        f(slot);
        slot.set_id(id);
        Ok(slot.clone())
    }

    /// Replace every link row of `parent_id` with rows for `student_ids`,
    /// keeping the caller's order. Repeated ids collapse to their first
    /// occurrence.
    pub(crate) fn set_parent_links(&mut self, parent_id: EntityId, student_ids: &[EntityId]) {
        let links = Arc::make_mut(&mut self.parent_students);
        links.retain(|l| l.parent_id != parent_id);
        for (i, &student_id) in student_ids.iter().enumerate() {
            if !student_ids[..i].contains(&student_id) {
                links.push(ParentStudentLink::new(parent_id, student_id));
            }
        }
    }

    /// Delete a record following its kind's [`DeletePolicy`], cascading
    /// to dependent collections.
    pub(crate) fn remove(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        now: DateTime<Utc>,
    ) -> Result<DeletePolicy, CoreError> {
        match kind {
            EntityKind::Establishment => {
                self.hard_remove::<Establishment>(id)?;
                null_refs(&mut self.buses, id, |b| &mut b.establishment_id);
                null_refs(&mut self.drivers, id, |d| &mut d.establishment_id);
                null_refs(&mut self.students, id, |s| &mut s.establishment_id);
                null_refs(&mut self.routes, id, |r| &mut r.establishment_id);
            }
            EntityKind::Bus => {
                self.hard_remove::<Bus>(id)?;
                null_refs(&mut self.trips, id, |t| &mut t.bus_id);
            }
            EntityKind::Route => {
                self.hard_remove::<Route>(id)?;
                null_refs(&mut self.trips, id, |t| &mut t.route_id);
                null_refs(&mut self.students, id, |s| &mut s.route_id);
            }
            EntityKind::Trip => self.hard_remove::<Trip>(id)?,
            EntityKind::Parent => {
                self.soft_remove::<Parent>(id, now)?;
                Arc::make_mut(&mut self.parent_students).retain(|l| l.parent_id != id);
            }
            EntityKind::Student => {
                self.soft_remove::<Student>(id, now)?;
                Arc::make_mut(&mut self.parent_students).retain(|l| l.student_id != id);
            }
            EntityKind::Driver => {
                self.soft_remove::<Driver>(id, now)?;
                null_refs(&mut self.buses, id, |b| &mut b.driver_id);
                null_refs(&mut self.trips, id, |t| &mut t.driver_id);
            }
        }
        Ok(kind.delete_policy())
    }

    fn hard_remove<T: Record>(&mut self, id: EntityId) -> Result<(), CoreError> {
        if self.find::<T>(id).is_none() {
            return Err(CoreError::NotFound { kind: T::KIND, id });
        }
        T::collection_mut(self).retain(|r| r.id() != id);
        Ok(())
    }

    fn soft_remove<T: Record>(&mut self, id: EntityId, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.modify::<T>(id, |r| r.mark_deleted(now)).map(|_| ())
    }

    // ── Dataset file ─────────────────────────────────────────────────

    /// Read a dataset file (the JSON form of a snapshot).
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CoreError::Dataset {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| CoreError::Dataset {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Write the dataset file via a sibling temp file and a rename, so a
    /// failed write never leaves a truncated dataset behind.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let io_err = |e: std::io::Error| CoreError::Dataset {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Internal(format!("dataset serialization failed: {e}")))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)
    }
}

/// Null every foreign key equal to `id`.
fn null_refs<T: Clone>(
    items: &mut Arc<Vec<T>>,
    id: EntityId,
    field: impl Fn(&mut T) -> &mut Option<EntityId>,
) {
    for item in Arc::make_mut(items).iter_mut() {
        let fk = field(item);
        if *fk == Some(id) {
            *fk = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::demo;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw)
    }

    #[test]
    fn bus_hard_delete_nulls_trip_references() {
        let mut snap = demo::snapshot();
        let bus_id = snap.trips.iter().find_map(|t| t.bus_id).unwrap();

        snap.remove(EntityKind::Bus, bus_id, Utc::now()).unwrap();

        assert!(snap.buses.iter().all(|b| b.id != bus_id));
        assert!(snap.trips.iter().all(|t| t.bus_id != Some(bus_id)));
    }

    #[test]
    fn establishment_hard_delete_nulls_every_reference() {
        let mut snap = demo::snapshot();
        let before = snap.clone();

        let policy = snap
            .remove(EntityKind::Establishment, id(1), Utc::now())
            .unwrap();

        assert_eq!(policy, DeletePolicy::Hard);
        assert_eq!(snap.establishments.len(), 2);
        assert!(snap.buses.iter().all(|b| b.establishment_id != Some(id(1))));
        assert!(snap.drivers.iter().all(|d| d.establishment_id != Some(id(1))));
        assert!(snap.students.iter().all(|s| s.establishment_id != Some(id(1))));
        assert!(snap.routes.iter().all(|r| r.establishment_id != Some(id(1))));
        // Rows are kept, only the reference goes.
        assert_eq!(snap.buses.len(), before.buses.len());
        assert_eq!(snap.buses[0].establishment_id, None);
        assert_eq!(snap.buses[4].establishment_id, Some(id(3)));
        assert_eq!(snap.routes[2].establishment_id, Some(id(3)));
    }

    #[test]
    fn driver_soft_delete_unassigns_buses_and_trips() {
        let mut snap = demo::snapshot();

        let policy = snap
            .remove(EntityKind::Driver, id(1), Utc::now())
            .unwrap();

        assert_eq!(policy, DeletePolicy::Soft);
        assert_eq!(snap.drivers.len(), 3);
        assert!(snap.drivers[0].deleted_at.is_some());
        assert!(snap.find::<Driver>(id(1)).is_none());
        assert!(snap.buses.iter().all(|b| b.driver_id != Some(id(1))));
        assert!(snap.trips.iter().all(|t| t.driver_id != Some(id(1))));
        assert_eq!(snap.buses[1].driver_id, Some(id(2)));
        assert_eq!(snap.trips[2].driver_id, Some(id(2)));
    }

    #[test]
    fn repeated_student_ids_collapse_to_one_link() {
        let mut snap = demo::snapshot();

        snap.set_parent_links(id(2), &[id(7), id(3), id(7)]);

        let links: Vec<EntityId> = snap.links_of_parent(id(2)).map(|l| l.student_id).collect();
        assert_eq!(links, vec![id(7), id(3)]);
    }

    #[test]
    fn student_soft_delete_keeps_row_and_drops_links() {
        let mut snap = demo::snapshot();
        let student_id = snap.parent_students[0].student_id;
        let before = snap.students.len();

        let policy = snap
            .remove(EntityKind::Student, student_id, Utc::now())
            .unwrap();

        assert_eq!(policy, DeletePolicy::Soft);
        assert_eq!(snap.students.len(), before);
        assert!(snap.find::<Student>(student_id).is_none());
        assert_eq!(snap.links_of_student(student_id).count(), 0);
    }

    #[test]
    fn soft_deleted_record_cannot_be_deleted_twice() {
        let mut snap = demo::snapshot();
        let parent_id = snap.parents[0].id;
        snap.remove(EntityKind::Parent, parent_id, Utc::now()).unwrap();

        let err = snap
            .remove(EntityKind::Parent, parent_id, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: EntityKind::Parent, .. }));
    }

    #[test]
    fn next_id_counts_soft_deleted_rows() {
        let mut snap = Snapshot::default();
        assert_eq!(snap.next_id::<Parent>(), id(1));

        snap.insert(Parent {
            id: id(4),
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            phone: None,
            deleted_at: None,
        });
        snap.remove(EntityKind::Parent, id(4), Utc::now()).unwrap();
        assert_eq!(snap.next_id::<Parent>(), id(5));
    }

    #[test]
    fn mutation_leaves_previous_snapshot_untouched() {
        let before = demo::snapshot();
        let mut after = before.clone();
        let bus_id = before.buses[0].id;

        after
            .modify::<Bus>(bus_id, |b| b.plate_number = "CHANGED".into())
            .unwrap();

        assert_ne!(before.buses[0].plate_number, "CHANGED");
        assert_eq!(after.buses[0].plate_number, "CHANGED");
        // Untouched collections still share storage.
        assert!(Arc::ptr_eq(&before.routes, &after.routes));
    }

    #[test]
    fn dataset_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dataset.json");
        let snap = demo::snapshot();

        snap.save(&path).unwrap();
        let loaded = Snapshot::load(&path).unwrap();

        assert_eq!(loaded, snap);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn unreadable_dataset_reports_path() {
        let err = Snapshot::load(Path::new("/nonexistent/dataset.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dataset.json"));
    }
}
