//! Student command handlers.

use std::sync::Arc;

use tabled::Tabled;

use schoolbus_core::command::{CreateStudentRequest, UpdateStudentRequest};
use schoolbus_core::view::StudentView;
use schoolbus_core::{Command as CoreCommand, Controller, EntityId, EntityKind, Student};

use crate::cli::{GlobalOpts, StudentsArgs, StudentsCommand};
use crate::error::CliError;
use crate::output::or_dash;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: EntityId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Establishment")]
    establishment: String,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Parents")]
    parents: String,
}

impl From<&Arc<StudentView>> for StudentRow {
    fn from(v: &Arc<StudentView>) -> Self {
        Self {
            id: v.student.id,
            name: v.student.full_name(),
            grade: or_dash(v.student.grade.as_deref()).to_owned(),
            establishment: v.establishment_name.clone(),
            route: v.route_name.clone(),
            parents: v.parent_names.clone(),
        }
    }
}

fn detail(v: &StudentView) -> String {
    let s = &v.student;
    [
        format!("ID:            {}", s.id),
        format!("Name:          {}", s.full_name()),
        format!("Grade:         {}", or_dash(s.grade.as_deref())),
        format!("Establishment: {}", v.establishment_name),
        format!("Route:         {}", v.route_name),
        format!("Parents:       {}", v.parent_names),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: StudentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StudentsCommand::List(list) => {
            util::list::<Student, _>(controller, list, global, |v| StudentRow::from(v), |v| {
                v.student.id.to_string()
            })
            .await
        }

        StudentsCommand::Get { id } => util::get::<Student>(controller, id, global, detail).await,

        StudentsCommand::Create {
            from_file,
            first_name,
            last_name,
            grade,
            establishment,
            route,
        } => {
            let req = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => CreateStudentRequest {
                    first_name: util::required(first_name, "first-name")?,
                    last_name: util::required(last_name, "last-name")?,
                    grade,
                    establishment_id: util::id(establishment),
                    route_id: util::id(route),
                },
            };
            util::execute(controller, CoreCommand::CreateStudent(req), global).await
        }

        StudentsCommand::Update {
            id,
            from_file,
            first_name,
            last_name,
            grade,
            establishment,
            route,
        } => {
            let update = match from_file {
                Some(path) => util::read_json_file(&path)?,
                None => UpdateStudentRequest {
                    first_name,
                    last_name,
                    grade,
                    establishment_id: util::id(establishment),
                    route_id: util::id(route),
                },
            };
            let cmd = CoreCommand::UpdateStudent {
                id: EntityId::new(id),
                update,
            };
            util::execute(controller, cmd, global).await
        }

        StudentsCommand::Delete { id } => {
            util::delete(controller, EntityKind::Student, id, global).await
        }
    }
}
