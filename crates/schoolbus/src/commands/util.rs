//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tabled::Tabled;

use schoolbus_core::{
    CategoryFilter, Command as CoreCommand, Confirm, Controller, CoreError, Enrich, EntityId,
    EntityKind, FilterState, Listing, Notifier,
};

use crate::cli::{GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

// ── Collaborators ───────────────────────────────────────────────────

/// Prints mutation acknowledgements to stderr. Failures are rendered by
/// the miette report in `main`, so they only reach the debug log here.
pub struct ConsoleNotifier {
    quiet: bool,
    color: bool,
}

impl ConsoleNotifier {
    pub fn new(global: &GlobalOpts) -> Self {
        Self {
            quiet: global.quiet,
            color: output::should_color(&global.color),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", output::success_line(message, self.color));
        }
    }

    fn notify_failure(&self, message: &str) {
        tracing::debug!(%message, "operation failed");
    }
}

/// Interactive yes/no prompt, auto-approving with `--yes`.
pub struct PromptConfirm {
    yes: bool,
}

impl PromptConfirm {
    /// Refuses to build a prompt that could never be answered.
    pub fn new(global: &GlobalOpts, action: &str) -> Result<Self, CliError> {
        if !global.yes && !std::io::stdin().is_terminal() {
            return Err(CliError::NonInteractiveRequiresYes {
                action: action.into(),
            });
        }
        Ok(Self { yes: global.yes })
    }
}

impl Confirm for PromptConfirm {
    fn confirm(&self, message: &str) -> bool {
        if self.yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

// ── Shared handlers ─────────────────────────────────────────────────

/// `<entity> list`: one filtered page.
pub async fn list<T, R>(
    controller: &Controller,
    args: ListArgs,
    global: &GlobalOpts,
    to_row: impl Fn(&Arc<T::View>) -> R,
    id_fn: impl Fn(&T::View) -> String,
) -> Result<(), CliError>
where
    T: Enrich,
    R: Tabled,
{
    let filter = FilterState::new(
        CategoryFilter::from(args.establishment.map(EntityId::new)),
        args.search.unwrap_or_default(),
    );
    let mut listing = Listing::<T>::new(controller.clone()).with_filter(filter);
    let page = listing.goto_page(args.page).await?;

    let out = output::render_page(&global.output, page, to_row, id_fn)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// `<entity> get <id>`.
pub async fn get<T: Enrich>(
    controller: &Controller,
    id: u64,
    global: &GlobalOpts,
    detail_fn: impl Fn(&T::View) -> String,
) -> Result<(), CliError> {
    let view = controller.get::<T>(EntityId::new(id)).await?;
    let out = output::render_single(&global.output, &view, detail_fn, |_| id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Run a create/update command. The notifier prints the acknowledgement;
/// plain output additionally echoes the id for scripting.
pub async fn execute(
    controller: &Controller,
    cmd: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller.execute(cmd).await?;
    if matches!(global.output, crate::cli::OutputFormat::Plain) {
        output::print_output(&result.id().to_string(), global.quiet);
    }
    Ok(())
}

/// `<entity> delete <id>` behind a confirmation prompt. A missing record
/// is reported before any prompt is considered.
pub async fn delete(
    controller: &Controller,
    kind: EntityKind,
    id: u64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = EntityId::new(id);
    if !controller.snapshot().contains(kind, id) {
        return Err(CoreError::NotFound { kind, id }.into());
    }

    let confirm = PromptConfirm::new(global, &format!("delete {} {id}", kind.label()))?;
    let outcome = controller.delete_confirmed(kind, id, &confirm).await?;
    if outcome.is_none() && !global.quiet {
        eprintln!("Aborted");
    }
    Ok(())
}

// ── Payload helpers ─────────────────────────────────────────────────

/// Read and parse a JSON payload file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("{}: {e}", path.display()),
    })
}

/// Unwrap a flag clap already enforces unless `--from-file` was given.
pub fn required<T>(value: Option<T>, flag: &str) -> Result<T, CliError> {
    value.ok_or_else(|| CliError::Validation {
        field: flag.into(),
        reason: "is required".into(),
    })
}

pub fn id(raw: Option<u64>) -> Option<EntityId> {
    raw.map(EntityId::new)
}

pub fn ids(raw: &[u64]) -> Vec<EntityId> {
    raw.iter().copied().map(EntityId::new).collect()
}

/// `-` when an optional id is unset.
pub fn show_id(id: Option<EntityId>) -> String {
    id.map_or_else(|| "-".into(), |id| id.to_string())
}
