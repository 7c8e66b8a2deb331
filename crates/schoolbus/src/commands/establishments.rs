//! Establishment command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateEstablishmentRequest, UpdateEstablishmentRequest};
use schoolbus_core::view::EstablishmentView;
use schoolbus_core::{Command as CoreCommand, Controller, EntityId, EntityKind, Establishment};

use crate::cli::{EstablishmentsArgs, EstablishmentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::or_dash;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EstablishmentRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Buses")]
    buses: usize,
    #[tabled(rename = "Students")]
    students: usize,
}

impl From<&Arc<EstablishmentView>> for EstablishmentRow {
    fn from(v: &Arc<EstablishmentView>) -> Self {
        Self {
            id: v.establishment.id,
            name: v.establishment.name.clone(),
            city: v.establishment.city.clone(),
            buses: v.bus_count,
            students: v.student_count,
        }
    }
}

fn detail(v: &EstablishmentView) -> String {
    let e = &v.establishment;
    [
        format!("ID:       {}", e.id),
        format!("Name:     {}", e.name),
        format!("Address:  {}", e.address),
        format!("City:     {}", e.city),
        format!("Phone:    {}", or_dash(e.phone.as_deref())),
        format!("Buses:    {}", v.bus_count),
        format!("Students: {}", v.student_count),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: EstablishmentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        EstablishmentsCommand::List(list) => {
            util::list::<Establishment, _>(
                controller,
                list,
                global,
                |v| EstablishmentRow::from(v),
                |v| v.establishment.id.to_string(),
            )
            .await
        }

        EstablishmentsCommand::Get { id } => {
            util::get::<Establishment>(controller, id, global, detail).await
        }

        EstablishmentsCommand::Create {
            from_file,
            name,
            address,
            city,
            phone,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateEstablishmentRequest {
                    name: util::required(name, "name")?,
                    address: util::required(address, "address")?,
                    city: util::required(city, "city")?,
                    phone,
                },
            };
            util::execute(controller, CoreCommand::CreateEstablishment(req), global).await
        }

        EstablishmentsCommand::Update {
            id,
            from_file,
            name,
            address,
            city,
            phone,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateEstablishmentRequest {
                    name,
                    address,
                    city,
                    phone,
                },
            };
            let cmd = CoreCommand::UpdateEstablishment {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        EstablishmentsCommand::Delete { id } => {
            util::delete(controller, EntityKind::Establishment, id, global).await
        }
    }
}
