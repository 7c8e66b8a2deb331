//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod buses;
pub mod config_cmd;
pub mod drivers;
pub mod establishments;
pub mod parents;
pub mod routes;
pub mod students;
pub mod trips;
pub mod util;

use schoolbus_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an entity command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Establishments(args) => establishments::handle(controller, args, global).await,
        Command::Buses(args) => buses::handle(controller, args, global).await,
        Command::Drivers(args) => drivers::handle(controller, args, global).await,
        Command::Parents(args) => parents::handle(controller, args, global).await,
        Command::Students(args) => students::handle(controller, args, global).await,
        Command::Routes(args) => routes::handle(controller, args, global).await,
        Command::Trips(args) => trips::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
