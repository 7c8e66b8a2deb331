//! Bus command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateBusRequest, UpdateBusRequest};
use schoolbus_core::view::BusView;
use schoolbus_core::{Bus, Command as CoreCommand, Controller, EntityId, EntityKind};

use crate::cli::{BusesArgs, BusesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::or_dash;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BusRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Make")]
    make: String,
    #[tabled(rename = "Seats")]
    capacity: u32,
    #[tabled(rename = "Establishment")]
    establishment: String,
    #[tabled(rename = "Driver")]
    driver: String,
}

impl From<&Arc<BusView>> for BusRow {
    fn from(v: &Arc<BusView>) -> Self {
        Self {
            id: v.bus.id,
            plate: v.bus.plate_number.clone(),
            make: v.bus.make.clone(),
            capacity: v.bus.capacity,
            establishment: v.establishment_name.clone(),
            driver: v.driver_name.clone(),
        }
    }
}

fn detail(v: &BusView) -> String {
    let b = &v.bus;
    [
        format!("ID:            {}", b.id),
        format!("Plate:         {}", b.plate_number),
        format!("Make:          {}", b.make),
        format!("Model:         {}", or_dash(b.model.as_deref())),
        format!("Seats:         {}", b.capacity),
        format!(
            "Establishment: {} ({})",
            v.establishment_name,
            util::show_id(b.establishment_id)
        ),
        format!("Driver:        {} ({})", v.driver_name, util::show_id(b.driver_id)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: BusesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BusesCommand::List(list) => {
            util::list::<Bus, _>(controller, list, global, |v| BusRow::from(v), |v| {
                v.bus.id.to_string()
            })
            .await
        }

        BusesCommand::Get { id } => util::get::<Bus>(controller, id, global, detail).await,

        BusesCommand::Create {
            from_file,
            plate,
            make,
            model,
            capacity,
            establishment,
            driver,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateBusRequest {
                    plate_number: util::required(plate, "plate")?,
                    make: util::required(make, "make")?,
                    model,
                    capacity: util::required(capacity, "capacity")?,
                    establishment_id: util::id(establishment),
                    driver_id: util::id(driver),
                },
            };
            util::execute(controller, CoreCommand::CreateBus(req), global).await
        }

        BusesCommand::Update {
            id,
            from_file,
            plate,
            make,
            model,
            capacity,
            establishment,
            driver,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateBusRequest {
                    plate_number: plate,
                    make,
                    model,
                    capacity,
                    establishment_id: util::id(establishment),
                    driver_id: util::id(driver),
                },
            };
            let cmd = CoreCommand::UpdateBus {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        BusesCommand::Delete { id } => util::delete(controller, EntityKind::Bus, id, global).await,
    }
}
