//! Driver command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateDriverRequest, UpdateDriverRequest};
use schoolbus_core::view::DriverView;
use schoolbus_core::{Command as CoreCommand, Controller, Driver, EntityId, EntityKind};

use crate::cli::{DriversArgs, DriversCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::or_dash;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DriverRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Establishment")]
    establishment: String,
    #[tabled(rename = "Bus")]
    bus: String,
}

impl From<&Arc<DriverView>> for DriverRow {
    fn from(v: &Arc<DriverView>) -> Self {
        Self {
            id: v.driver.id,
            name: v.driver.full_name(),
            email: v.driver.email.clone(),
            establishment: v.establishment_name.clone(),
            bus: v.bus_plate.clone(),
        }
    }
}

fn detail(v: &DriverView) -> String {
    let d = &v.driver;
    [
        format!("ID:            {}", d.id),
        format!("Name:          {}", d.full_name()),
        format!("Email:         {}", d.email),
        format!("Phone:         {}", or_dash(d.phone.as_deref())),
        format!("Licence:       {}", or_dash(d.license_number.as_deref())),
        format!("Establishment: {}", v.establishment_name),
        format!("Bus:           {}", v.bus_plate),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DriversArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DriversCommand::List(list) => {
            util::list::<Driver, _>(controller, list, global, |v| DriverRow::from(v), |v| {
                v.driver.id.to_string()
            })
            .await
        }

        DriversCommand::Get { id } => util::get::<Driver>(controller, id, global, detail).await,

        DriversCommand::Create {
            from_file,
            first_name,
            last_name,
            email,
            phone,
            license,
            establishment,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateDriverRequest {
                    first_name: util::required(first_name, "first-name")?,
                    last_name: util::required(last_name, "last-name")?,
                    email: util::required(email, "email")?,
                    phone,
                    license_number: license,
                    establishment_id: util::id(establishment),
                },
            };
            util::execute(controller, CoreCommand::CreateDriver(req), global).await
        }

        DriversCommand::Update {
            id,
            from_file,
            first_name,
            last_name,
            email,
            phone,
            license,
            establishment,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateDriverRequest {
                    first_name,
                    last_name,
                    email,
                    phone,
                    license_number: license,
                    establishment_id: util::id(establishment),
                },
            };
            let cmd = CoreCommand::UpdateDriver {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        DriversCommand::Delete { id } => {
            util::delete(controller, EntityKind::Driver, id, global).await
        }
    }
}
