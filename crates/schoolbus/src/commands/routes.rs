//! Route command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateRouteRequest, UpdateRouteRequest};
use schoolbus_core::view::RouteView;
use schoolbus_core::{Command as CoreCommand, Controller, EntityId, EntityKind, Route};

use crate::cli::{GlobalOpts, RoutesArgs, RoutesCommand};
use crate::error::CliError;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Establishment")]
    establishment: String,
    #[tabled(rename = "Stops")]
    stops: usize,
    #[tabled(rename = "Students")]
    students: usize,
}

impl From<&Arc<RouteView>> for RouteRow {
    fn from(v: &Arc<RouteView>) -> Self {
        Self {
            id: v.route.id,
            name: v.route.name.clone(),
            establishment: v.establishment_name.clone(),
            stops: v.route.stops.len(),
            students: v.student_count,
        }
    }
}

fn detail(v: &RouteView) -> String {
    let r = &v.route;
    let mut lines = vec![
        format!("ID:            {}", r.id),
        format!("Name:          {}", r.name),
        format!("Establishment: {}", v.establishment_name),
        format!("Students:      {}", v.student_count),
        "Stops:".to_owned(),
    ];
    lines.extend(
        r.stops
            .iter()
            .enumerate()
            .map(|(i, stop)| format!("  {}. {stop}", i + 1)),
    );
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: RoutesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RoutesCommand::List(list) => {
            util::list::<Route, _>(controller, list, global, |v| RouteRow::from(v), |v| {
                v.route.id.to_string()
            })
            .await
        }

        RoutesCommand::Get { id } => util::get::<Route>(controller, id, global, detail).await,

        RoutesCommand::Create {
            from_file,
            name,
            establishment,
            stops,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateRouteRequest {
                    name: util::required(name, "name")?,
                    establishment_id: util::id(establishment),
                    stops,
                },
            };
            util::execute(controller, CoreCommand::CreateRoute(req), global).await
        }

        RoutesCommand::Update {
            id,
            from_file,
            name,
            establishment,
            stops,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateRouteRequest {
                    name,
                    establishment_id: util::id(establishment),
                    stops,
                },
            };
            let cmd = CoreCommand::UpdateRoute {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        RoutesCommand::Delete { id } => {
            util::delete(controller, EntityKind::Route, id, global).await
        }
    }
}
