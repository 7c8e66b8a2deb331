//! Parent command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateParentRequest, UpdateParentRequest};
use schoolbus_core::view::ParentView;
use schoolbus_core::{Command as CoreCommand, Controller, EntityId, EntityKind, Parent};

use crate::cli::{GlobalOpts, ParentsArgs, ParentsCommand};
use crate::error::CliError;
use crate::output::or_dash;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ParentRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Students")]
    students: String,
}

impl From<&Arc<ParentView>> for ParentRow {
    fn from(v: &Arc<ParentView>) -> Self {
        Self {
            id: v.parent.id,
            name: v.parent.full_name(),
            email: v.parent.email.clone(),
            phone: or_dash(v.parent.phone.as_deref()).to_owned(),
            students: v.student_names.clone(),
        }
    }
}

fn detail(v: &ParentView) -> String {
    let p = &v.parent;
    let ids = v
        .student_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    [
        format!("ID:       {}", p.id),
        format!("Name:     {}", p.full_name()),
        format!("Email:    {}", p.email),
        format!("Phone:    {}", or_dash(p.phone.as_deref())),
        format!("Students: {}", v.student_names),
        format!("          [{ids}]"),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ParentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ParentsCommand::List(list) => {
            util::list::<Parent, _>(controller, list, global, |v| ParentRow::from(v), |v| {
                v.parent.id.to_string()
            })
            .await
        }

        ParentsCommand::Get { id } => util::get::<Parent>(controller, id, global, detail).await,

        ParentsCommand::Create {
            from_file,
            first_name,
            last_name,
            email,
            phone,
            students,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateParentRequest {
                    first_name: util::required(first_name, "first-name")?,
                    last_name: util::required(last_name, "last-name")?,
                    email: util::required(email, "email")?,
                    phone,
                    student_ids: util::ids(&students),
                },
            };
            util::execute(controller, CoreCommand::CreateParent(req), global).await
        }

        ParentsCommand::Update {
            id,
            from_file,
            first_name,
            last_name,
            email,
            phone,
            students,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateParentRequest {
                    first_name,
                    last_name,
                    email,
                    phone,
                    student_ids: students.as_deref().map(util::ids),
                },
            };
            let cmd = CoreCommand::UpdateParent {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        ParentsCommand::Delete { id } => {
            util::delete(controller, EntityKind::Parent, id, global).await
        }
    }
}
