//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables are built
//! dynamically from the visible columns with `tabled`, structured formats
//! use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use parkly_core::{ACTIONS_COLUMN, ColumnVisibility, Level, Notification, Resource};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Applies colors only when enabled.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn success(self, text: &str) -> String {
        if self.enabled {
            text.green().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn error(self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn heading(self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn muted(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        }
    }
}

/// Print queued notifications to stderr, one per line.
pub fn print_notifications(notifications: &[Notification], palette: Palette, quiet: bool) {
    let mut stderr = io::stderr().lock();
    for n in notifications {
        match n.level {
            Level::Success if !quiet => {
                let _ = writeln!(stderr, "{} {}", palette.success("✓"), n.message);
            }
            Level::Error => {
                let _ = writeln!(stderr, "{} {}", palette.error("✗"), n.message);
            }
            Level::Success => {}
        }
    }
}

// ── Progress ─────────────────────────────────────────────────────────

/// Spinner on stderr while a request is in flight; `None` when stderr is
/// not a terminal or output is quiet.
pub fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet || !io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

/// Stop and erase a spinner started by [`spinner`].
pub fn finish(bar: Option<ProgressBar>) {
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render records in the chosen format.
///
/// - `table`: one column per visible column, cells from [`Resource::cell`]
/// - `json` / `json-compact` / `yaml`: the records via serde
/// - `plain`: one id per line
pub fn render_records<R: Resource>(
    format: OutputFormat,
    records: &[&R],
    columns: &ColumnVisibility,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let visible: Vec<_> = columns.visible().collect();
            let mut builder = Builder::default();
            builder.push_record(visible.iter().map(|c| c.label));
            for record in records {
                builder.push_record(visible.iter().map(|c| {
                    if c.key == ACTIONS_COLUMN {
                        R::KIND.row_actions().to_owned()
                    } else {
                        record.cell(c.key)
                    }
                }));
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json_pretty(records),
        OutputFormat::JsonCompact => render_json_compact(records),
        OutputFormat::Yaml => render_yaml(records),
        OutputFormat::Plain => Ok(records
            .iter()
            .map(|r| r.id().to_string())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are laid out
/// by hand.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Label / value table with no header row.
pub fn render_pairs<L: AsRef<str>>(rows: &[(L, String)]) -> String {
    let mut builder = Builder::default();
    for (label, value) in rows {
        builder.push_record([label.as_ref().to_owned(), value.clone()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Table with a header row.
pub fn render_grid(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
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

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

/// YAML output.
pub(crate) fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}
