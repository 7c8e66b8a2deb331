//! Trip command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateTripRequest, UpdateTripRequest};
use schoolbus_core::view::TripView;
use schoolbus_core::{Command as CoreCommand, Controller, EntityId, EntityKind, Trip};

use crate::cli::{GlobalOpts, TripsArgs, TripsCommand};
use crate::error::CliError;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TripRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Departure")]
    departure: String,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Bus")]
    bus: String,
    #[tabled(rename = "Driver")]
    driver: String,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Arc<TripView>> for TripRow {
    fn from(v: &Arc<TripView>) -> Self {
        Self {
            id: v.trip.id,
            date: v.trip.date.to_string(),
            departure: v.trip.departure_time.format("%H:%M").to_string(),
            route: v.route_name.clone(),
            bus: v.bus_plate.clone(),
            driver: v.driver_name.clone(),
            direction: v.trip.direction.to_string(),
            status: v.trip.status.to_string(),
        }
    }
}

fn detail(v: &TripView) -> String {
    let t = &v.trip;
    [
        format!("ID:        {}", t.id),
        format!("Date:      {}", t.date),
        format!("Departure: {}", t.departure_time.format("%H:%M")),
        format!("Direction: {}", t.direction),
        format!("Status:    {}", t.status),
        format!("Route:     {} ({})", v.route_name, util::show_id(t.route_id)),
        format!("Bus:       {} ({})", v.bus_plate, util::show_id(t.bus_id)),
        format!("Driver:    {} ({})", v.driver_name, util::show_id(t.driver_id)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: TripsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TripsCommand::List(list) => {
            util::list::<Trip, _>(controller, list, global, |v| TripRow::from(v), |v| {
                v.trip.id.to_string()
            })
            .await
        }

        TripsCommand::Get { id } => util::get::<Trip>(controller, id, global, detail).await,

        TripsCommand::Create {
            from_file,
            route,
            bus,
            driver,
            date,
            departure,
            direction,
            status,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateTripRequest {
                    route_id: util::id(route),
                    bus_id: util::id(bus),
                    driver_id: util::id(driver),
                    date: util::required(date, "date")?,
                    departure_time: util::required(departure, "departure")?,
                    direction: direction.map(Into::into).unwrap_or_default(),
                    status: status.map(Into::into).unwrap_or_default(),
                },
            };
            util::execute(controller, CoreCommand::CreateTrip(req), global).await
        }

        TripsCommand::Update {
            id,
            from_file,
            route,
            bus,
            driver,
            date,
            departure,
            direction,
            status,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateTripRequest {
                    route_id: util::id(route),
                    bus_id: util::id(bus),
                    driver_id: util::id(driver),
                    date,
                    departure_time: departure,
                    direction: direction.map(Into::into),
                    status: status.map(Into::into),
                },
            };
            let cmd = CoreCommand::UpdateTrip {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        TripsCommand::Delete { id } => util::delete(controller, EntityKind::Trip, id, global).await,
    }
}
