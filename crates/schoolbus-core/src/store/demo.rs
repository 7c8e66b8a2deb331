// ── Built-in demo dataset ──
//
// Used when the local backend has no dataset file yet. Small enough to
// page through by hand, with one establishment that owns no buses.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use super::Snapshot;
use crate::model::{
    Bus, Driver, EntityId, Establishment, Parent, ParentStudentLink, Route, Student, Trip,
    TripDirection, TripStatus,
};

fn id(raw: u64) -> EntityId {
    EntityId::new(raw)
}

fn some(raw: u64) -> Option<EntityId> {
    Some(EntityId::new(raw))
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, d).unwrap_or_default()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn establishment(raw: u64, name: &str, address: &str, city: &str) -> Establishment {
    Establishment {
        id: id(raw),
        name: name.into(),
        address: address.into(),
        city: city.into(),
        phone: None,
    }
}

fn bus(raw: u64, plate: &str, make: &str, capacity: u32, est: u64, driver: Option<u64>) -> Bus {
    Bus {
        id: id(raw),
        plate_number: plate.into(),
        make: make.into(),
        model: None,
        capacity,
        establishment_id: some(est),
        driver_id: driver.map(EntityId::new),
    }
}

fn driver(raw: u64, first: &str, last: &str, license: &str, est: u64) -> Driver {
    Driver {
        id: id(raw),
        first_name: first.into(),
        last_name: last.into(),
        email: format!("{}.{}@schoolbus.ma", first.to_lowercase(), last.to_lowercase()),
        phone: None,
        license_number: Some(license.into()),
        establishment_id: some(est),
        deleted_at: None,
    }
}

fn parent(raw: u64, first: &str, last: &str, phone: &str) -> Parent {
    Parent {
        id: id(raw),
        first_name: first.into(),
        last_name: last.into(),
        email: format!("{}.{}@example.ma", first.to_lowercase(), last.to_lowercase()),
        phone: Some(phone.into()),
        deleted_at: None,
    }
}

fn student(raw: u64, first: &str, last: &str, grade: &str, est: u64, route: u64) -> Student {
    Student {
        id: id(raw),
        first_name: first.into(),
        last_name: last.into(),
        grade: Some(grade.into()),
        establishment_id: some(est),
        route_id: some(route),
        deleted_at: None,
    }
}

fn route(raw: u64, name: &str, est: u64, stops: &[&str]) -> Route {
    Route {
        id: id(raw),
        name: name.into(),
        establishment_id: some(est),
        stops: stops.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn trip(raw: u64, route: u64, bus: u64, driver: u64, date: NaiveDate, dir: TripDirection) -> Trip {
    Trip {
        id: id(raw),
        route_id: some(route),
        bus_id: some(bus),
        driver_id: some(driver),
        date,
        departure_time: match dir {
            TripDirection::Pickup => at(7, 15),
            TripDirection::Dropoff => at(16, 30),
        },
        direction: dir,
        status: TripStatus::Scheduled,
    }
}

/// The demo dataset.
pub fn snapshot() -> Snapshot {
    use TripDirection::{Dropoff, Pickup};

    Snapshot {
        establishments: Arc::new(vec![
            establishment(1, "Collège Belorado", "12 rue des Lilas", "Rabat"),
            establishment(2, "Lycée Ibn Sina", "4 avenue Hassan II", "Salé"),
            establishment(3, "École Al Amal", "27 boulevard Zerktouni", "Casablanca"),
        ]),
        buses: Arc::new(vec![
            bus(1, "1234-A-6", "Mercedes", 45, 1, Some(1)),
            bus(2, "5678-B-6", "Iveco", 35, 1, Some(2)),
            bus(3, "9012-A-1", "Volvo", 50, 1, None),
            bus(4, "3456-D-1", "Renault", 30, 1, None),
            bus(5, "7890-H-6", "Isuzu", 28, 3, Some(3)),
            bus(6, "2468-A-6", "Scania", 52, 3, None),
            bus(7, "1357-W-6", "Hyundai", 40, 3, None),
        ]),
        drivers: Arc::new(vec![
            driver(1, "Youssef", "Benali", "P-448812", 1),
            driver(2, "Karim", "Tazi", "P-113094", 1),
            driver(3, "Samir", "Alaoui", "P-902771", 3),
        ]),
        parents: Arc::new(vec![
            parent(1, "Fatima", "Zahra", "0612345678"),
            parent(2, "Mohammed", "Idrissi", "0623456789"),
            parent(3, "Nadia", "Cherkaoui", "0634567890"),
            parent(4, "Hassan", "Bennani", "0645678901"),
        ]),
        students: Arc::new(vec![
            student(1, "Amine", "Zahra", "6ème", 1, 1),
            student(2, "Salma", "Zahra", "4ème", 1, 1),
            student(3, "Omar", "Idrissi", "5ème", 1, 2),
            student(4, "Yasmine", "Cherkaoui", "3ème", 1, 2),
            student(5, "Ilyas", "Cherkaoui", "6ème", 1, 1),
            student(6, "Rania", "Bennani", "CM2", 3, 3),
            student(7, "Adam", "Fassi", "CM1", 3, 3),
            student(8, "Lina", "Berrada", "CE2", 3, 3),
            student(9, "Mehdi", "Kettani", "4ème", 1, 2),
            student(10, "Sara", "Lahlou", "CM2", 3, 3),
            student(11, "Ayoub", "Lahlou", "CE1", 3, 3),
            student(12, "Hiba", "Sqalli", "5ème", 1, 1),
        ]),
        routes: Arc::new(vec![
            route(1, "Circuit Nord", 1, &["Agdal", "Hassan", "Océan"]),
            route(2, "Circuit Sud", 1, &["Souissi", "Hay Riad"]),
            route(3, "Circuit Centre", 3, &["Maârif", "Gauthier", "Racine"]),
        ]),
        trips: Arc::new(vec![
            trip(1, 1, 1, 1, day(7), Pickup),
            trip(2, 1, 1, 1, day(7), Dropoff),
            trip(3, 2, 2, 2, day(7), Pickup),
            trip(4, 3, 5, 3, day(7), Pickup),
        ]),
        parent_students: Arc::new(vec![
            ParentStudentLink::new(id(1), id(1)),
            ParentStudentLink::new(id(1), id(2)),
            ParentStudentLink::new(id(2), id(3)),
            ParentStudentLink::new(id(3), id(4)),
            ParentStudentLink::new(id(3), id(5)),
            ParentStudentLink::new(id(4), id(6)),
        ]),
    }
}
