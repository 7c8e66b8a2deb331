// ── Typed request payloads ──
//
// Create requests carry every required field; update requests are
// all-optional patches merged onto the existing record. Both serialize
// to the backend's camelCase JSON and can be read back from a file.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{CreateRequest, UpdateRequest};
use crate::error::CoreError;
use crate::model::{
    Bus, Driver, EntityId, Establishment, Parent, Route, Student, Trip, TripDirection, TripStatus,
};

// ── Validation helpers ─────────────────────────────────────────────

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "is required"));
    }
    Ok(())
}

fn require_if_set(field: &str, value: Option<&String>) -> Result<(), CoreError> {
    value.map_or(Ok(()), |v| require(field, v))
}

fn email(field: &str, value: &str) -> Result<(), CoreError> {
    require(field, value)?;
    if !value.contains('@') {
        return Err(CoreError::validation(field, "must be an email address"));
    }
    Ok(())
}

fn positive(field: &str, value: u32) -> Result<(), CoreError> {
    if value == 0 {
        return Err(CoreError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

fn set<T: Clone>(slot: &mut T, value: Option<&T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

fn set_some<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

// ── Establishment ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstablishmentRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CreateRequest for CreateEstablishmentRequest {
    type Record = Establishment;

    fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("address", &self.address)?;
        require("city", &self.city)
    }

    fn into_record(self, id: EntityId) -> Establishment {
        Establishment {
            id,
            name: self.name,
            address: self.address,
            city: self.city,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEstablishmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UpdateRequest for UpdateEstablishmentRequest {
    type Record = Establishment;

    fn validate(&self) -> Result<(), CoreError> {
        require_if_set("name", self.name.as_ref())?;
        require_if_set("address", self.address.as_ref())?;
        require_if_set("city", self.city.as_ref())
    }

    fn apply(&self, e: &mut Establishment) {
        set(&mut e.name, self.name.as_ref());
        set(&mut e.address, self.address.as_ref());
        set(&mut e.city, self.city.as_ref());
        set_some(&mut e.phone, self.phone.as_ref());
    }
}

// ── Bus ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusRequest {
    pub plate_number: String,
    pub make: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<EntityId>,
}

impl CreateRequest for CreateBusRequest {
    type Record = Bus;

    fn validate(&self) -> Result<(), CoreError> {
        require("plateNumber", &self.plate_number)?;
        require("make", &self.make)?;
        positive("capacity", self.capacity)
    }

    fn into_record(self, id: EntityId) -> Bus {
        Bus {
            id,
            plate_number: self.plate_number,
            make: self.make,
            model: self.model,
            capacity: self.capacity,
            establishment_id: self.establishment_id,
            driver_id: self.driver_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<EntityId>,
}

impl UpdateRequest for UpdateBusRequest {
    type Record = Bus;

    fn validate(&self) -> Result<(), CoreError> {
        require_if_set("plateNumber", self.plate_number.as_ref())?;
        require_if_set("make", self.make.as_ref())?;
        self.capacity.map_or(Ok(()), |c| positive("capacity", c))
    }

    fn apply(&self, b: &mut Bus) {
        set(&mut b.plate_number, self.plate_number.as_ref());
        set(&mut b.make, self.make.as_ref());
        set_some(&mut b.model, self.model.as_ref());
        set(&mut b.capacity, self.capacity.as_ref());
        set_some(&mut b.establishment_id, self.establishment_id.as_ref());
        set_some(&mut b.driver_id, self.driver_id.as_ref());
    }
}

// ── Driver ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
}

impl CreateRequest for CreateDriverRequest {
    type Record = Driver;

    fn validate(&self) -> Result<(), CoreError> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        email("email", &self.email)
    }

    fn into_record(self, id: EntityId) -> Driver {
        Driver {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            license_number: self.license_number,
            establishment_id: self.establishment_id,
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
}

impl UpdateRequest for UpdateDriverRequest {
    type Record = Driver;

    fn validate(&self) -> Result<(), CoreError> {
        require_if_set("firstName", self.first_name.as_ref())?;
        require_if_set("lastName", self.last_name.as_ref())?;
        self.email.as_deref().map_or(Ok(()), |e| email("email", e))
    }

    fn apply(&self, d: &mut Driver) {
        set(&mut d.first_name, self.first_name.as_ref());
        set(&mut d.last_name, self.last_name.as_ref());
        set(&mut d.email, self.email.as_ref());
        set_some(&mut d.phone, self.phone.as_ref());
        set_some(&mut d.license_number, self.license_number.as_ref());
        set_some(&mut d.establishment_id, self.establishment_id.as_ref());
    }
}

// ── Parent ─────────────────────────────────────────────────────────

/// Creating a parent also links it to `student_ids`, as one command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Link rows are created separately; never part of the parent payload.
    #[serde(default, skip_serializing)]
    pub student_ids: Vec<EntityId>,
}

impl CreateRequest for CreateParentRequest {
    type Record = Parent;

    fn validate(&self) -> Result<(), CoreError> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        email("email", &self.email)
    }

    fn into_record(self, id: EntityId) -> Parent {
        Parent {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Replaces the parent's links when set.
    #[serde(default, skip_serializing)]
    pub student_ids: Option<Vec<EntityId>>,
}

impl UpdateRequest for UpdateParentRequest {
    type Record = Parent;

    fn validate(&self) -> Result<(), CoreError> {
        require_if_set("firstName", self.first_name.as_ref())?;
        require_if_set("lastName", self.last_name.as_ref())?;
        self.email.as_deref().map_or(Ok(()), |e| email("email", e))
    }

    fn apply(&self, p: &mut Parent) {
        set(&mut p.first_name, self.first_name.as_ref());
        set(&mut p.last_name, self.last_name.as_ref());
        set(&mut p.email, self.email.as_ref());
        set_some(&mut p.phone, self.phone.as_ref());
    }
}

// ── Student ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<EntityId>,
}

impl CreateRequest for CreateStudentRequest {
    type Record = Student;

    fn validate(&self) -> Result<(), CoreError> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)
    }

    fn into_record(self, id: EntityId) -> Student {
        Student {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            grade: self.grade,
            establishment_id: self.establishment_id,
            route_id: self.route_id,
            deleted_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<EntityId>,
}

impl UpdateRequest for UpdateStudentRequest {
    type Record = Student;

    fn validate(&self) -> Result<(), CoreError> {
        require_if_set("firstName", self.first_name.as_ref())?;
        require_if_set("lastName", self.last_name.as_ref())
    }

    fn apply(&self, s: &mut Student) {
        set(&mut s.first_name, self.first_name.as_ref());
        set(&mut s.last_name, self.last_name.as_ref());
        set_some(&mut s.grade, self.grade.as_ref());
        set_some(&mut s.establishment_id, self.establishment_id.as_ref());
        set_some(&mut s.route_id, self.route_id.as_ref());
    }
}

// ── Route ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
    #[serde(default)]
    pub stops: Vec<String>,
}

impl CreateRequest for CreateRouteRequest {
    type Record = Route;

    fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        if self.stops.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::validation("stops", "stop names cannot be blank"));
        }
        Ok(())
    }

    fn into_record(self, id: EntityId) -> Route {
        Route {
            id,
            name: self.name,
            establishment_id: self.establishment_id,
            stops: self.stops,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<String>>,
}

impl UpdateRequest for UpdateRouteRequest {
    type Record = Route;

    fn validate(&self) -> Result<(), CoreError> {
        require_if_set("name", self.name.as_ref())?;
        if self
            .stops
            .as_ref()
            .is_some_and(|stops| stops.iter().any(|s| s.trim().is_empty()))
        {
            return Err(CoreError::validation("stops", "stop names cannot be blank"));
        }
        Ok(())
    }

    fn apply(&self, r: &mut Route) {
        set(&mut r.name, self.name.as_ref());
        set_some(&mut r.establishment_id, self.establishment_id.as_ref());
        set(&mut r.stops, self.stops.as_ref());
    }
}

// ── Trip ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub route_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<EntityId>,
    pub date: NaiveDate,
    pub departure_time: NaiveTime,
    #[serde(default)]
    pub direction: TripDirection,
    #[serde(default)]
    pub status: TripStatus,
}

impl CreateRequest for CreateTripRequest {
    type Record = Trip;

    fn validate(&self) -> Result<(), CoreError> {
        if self.route_id.is_none() {
            return Err(CoreError::validation("routeId", "is required"));
        }
        Ok(())
    }

    fn into_record(self, id: EntityId) -> Trip {
        Trip {
            id,
            route_id: self.route_id,
            bus_id: self.bus_id,
            driver_id: self.driver_id,
            date: self.date,
            departure_time: self.departure_time,
            direction: self.direction,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TripDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TripStatus>,
}

impl UpdateRequest for UpdateTripRequest {
    type Record = Trip;

    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }

    fn apply(&self, t: &mut Trip) {
        set_some(&mut t.route_id, self.route_id.as_ref());
        set_some(&mut t.bus_id, self.bus_id.as_ref());
        set_some(&mut t.driver_id, self.driver_id.as_ref());
        set(&mut t.date, self.date.as_ref());
        set(&mut t.departure_time, self.departure_time.as_ref());
        set(&mut t.direction, self.direction.as_ref());
        set(&mut t.status, self.status.as_ref());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_field_is_rejected() {
        let req = CreateBusRequest {
            plate_number: "  ".into(),
            make: "Volvo".into(),
            model: None,
            capacity: 40,
            establishment_id: None,
            driver_id: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: plateNumber: is required");
    }

    #[test]
    fn update_never_touches_identity() {
        let mut bus = Bus {
            id: EntityId::new(3),
            plate_number: "A".into(),
            make: "B".into(),
            model: None,
            capacity: 10,
            establishment_id: None,
            driver_id: None,
        };
        let patch: UpdateBusRequest =
            serde_json::from_str(r#"{"id": 99, "capacity": 12}"#).unwrap();

        patch.apply(&mut bus);

        assert_eq!(bus.id, EntityId::new(3));
        assert_eq!(bus.capacity, 12);
        assert_eq!(bus.make, "B");
    }

    #[test]
    fn parent_payload_omits_student_ids() {
        let req: CreateParentRequest = serde_json::from_str(
            r#"{"firstName":"A","lastName":"B","email":"a@b.ma","studentIds":[10,11]}"#,
        )
        .unwrap();
        assert_eq!(req.student_ids.len(), 2);

        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("studentIds").is_none());
    }

    #[test]
    fn trip_requires_route() {
        let req: CreateTripRequest = serde_json::from_str(
            r#"{"routeId":null,"date":"2026-09-07","departureTime":"07:15:00"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }
}
