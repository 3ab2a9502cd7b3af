//! `columns` handler: show or change which columns a table displays.
//!
//! Choices are saved to the config file and picked up by every later
//! `list` of that table.

use serde::Serialize;

use parkly_config::{load_config, save_config};
use parkly_core::{ColumnVisibility, ResourceKind};

use crate::cli::{ColumnsArgs, GlobalOpts, OutputFormat, TableKind};
use crate::context::{output_format, palette};
use crate::error::CliError;
use crate::output::{self, Palette};

pub fn resource_kind(table: TableKind) -> ResourceKind {
    match table {
        TableKind::Users => ResourceKind::Users,
        TableKind::Spots => ResourceKind::ParkingSpots,
        TableKind::Payments => ResourceKind::Payments,
        TableKind::Reservations => ResourceKind::Reservations,
    }
}

/// Apply `--reset`, `--all`, `--none`, then each `--toggle` in order.
///
/// Returns whether anything was requested.
fn apply(columns: &mut ColumnVisibility, args: &ColumnsArgs) -> Result<bool, CliError> {
    if args.reset {
        columns.reset();
    }
    if args.all {
        columns.toggle_all(true);
    }
    if args.none {
        columns.toggle_all(false);
    }
    for key in &args.toggle {
        if !columns.toggle(key) {
            let valid = columns
                .entries()
                .map(|(c, _)| c.key)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CliError::Validation {
                field: "toggle".into(),
                reason: format!("unknown column '{key}'. Valid columns: {valid}"),
            });
        }
    }
    Ok(args.reset || args.all || args.none || !args.toggle.is_empty())
}

#[derive(Serialize)]
struct ColumnState {
    key: &'static str,
    label: &'static str,
    visible: bool,
}

fn states(columns: &ColumnVisibility) -> Vec<ColumnState> {
    columns
        .entries()
        .map(|(c, visible)| ColumnState {
            key: c.key,
            label: c.label,
            visible,
        })
        .collect()
}

fn render_states(states: &[ColumnState], all_selected: bool, palette: Palette) -> String {
    let rows = states
        .iter()
        .map(|s| {
            vec![
                if s.visible { "[x]" } else { "[ ]" }.to_owned(),
                s.key.to_owned(),
                s.label.to_owned(),
            ]
        })
        .collect();
    let mut out = output::render_grid(&["", "Key", "Label"], rows);
    if all_selected {
        out.push('\n');
        out.push_str(&palette.muted("All columns shown"));
    }
    out
}

pub fn handle(args: &ColumnsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = load_config()?;
    let kind = resource_kind(args.table);
    let mut columns = cfg.column_visibility(kind);

    if apply(&mut columns, args)? {
        cfg.set_column_visibility(kind, &columns);
        let path = save_config(&cfg)?;
        tracing::debug!(path = %path.display(), %kind, "column selection saved");
    }

    let format = output_format(global, &cfg);
    let rows = states(&columns);
    let out = match format {
        OutputFormat::Plain => columns.visible_keys().join("\n"),
        _ => output::render_single(
            format,
            &rows,
            |s| render_states(s, columns.is_all_selected(), palette(global, &cfg)),
            |_| String::new(),
        )?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
