//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use schoolbus_core::ListView;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

pub const NO_RESULTS: &str = "No results";

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled on stderr.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

pub fn success_line(message: &str, color: bool) -> String {
    if color {
        format!("{} {message}", "✓".green().bold())
    } else {
        format!("✓ {message}")
    }
}

pub fn dimmed(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one listing page in the chosen format.
///
/// - `table`: rows plus a `Page X of Y (N results)` footer, or `No results`
/// - `json` / `json-compact` / `yaml`: the page's view records
/// - `plain`: one id per line
pub fn render_page<V, R>(
    format: &OutputFormat,
    page: &ListView<V>,
    to_row: impl Fn(&Arc<V>) -> R,
    id_fn: impl Fn(&V) -> String,
) -> Result<String, CliError>
where
    V: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table if page.is_empty() => Ok(NO_RESULTS.into()),
        OutputFormat::Table => {
            let rows: Vec<R> = page.items.iter().map(to_row).collect();
            Ok(format!("{}\n{}", render_table(&rows), footer(page)))
        }
        OutputFormat::Json => render_json(&page.items, false),
        OutputFormat::JsonCompact => render_json(&page.items, true),
        OutputFormat::Yaml => render_yaml(&page.items),
        OutputFormat::Plain => Ok(page
            .items
            .iter()
            .map(|v| id_fn(v))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// `Page X of Y (N results)`. Y is at least 1 even when nothing matched.
pub fn footer<V>(page: &ListView<V>) -> String {
    match page.total_count {
        Some(1) => format!("Page {} of {} (1 result)", page.page, page.display_total_pages()),
        Some(n) => format!(
            "Page {} of {} ({n} results)",
            page.page,
            page.display_total_pages()
        ),
        None => format!("Page {} of {}", page.page, page.display_total_pages()),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item detail views don't
/// use the `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

/// `-` for absent optional values in detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
