//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use parkly_core::EntityId;

use crate::cli::DraftArgs;
use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Collect `--from-file` and `--set` into one JSON object.
///
/// `--set` values win over the file. `FIELD=VALUE` sets a string,
/// `FIELD:=JSON` sets a raw JSON value (`amount:=15000`, `card_id:=null`).
pub fn draft_fields(args: &DraftArgs) -> Result<Map<String, Value>, CliError> {
    let mut fields = match &args.from_file {
        Some(path) => match read_json_file(path)? {
            Value::Object(map) => map,
            _ => {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected a JSON object".into(),
                });
            }
        },
        None => Map::new(),
    };

    for pair in &args.fields {
        let (key, raw) = pair.split_once('=').ok_or_else(|| CliError::Validation {
            field: "set".into(),
            reason: format!("expected FIELD=VALUE, got '{pair}'"),
        })?;
        let (key, raw_json) = match key.strip_suffix(':') {
            Some(key) => (key.trim(), true),
            None => (key.trim(), false),
        };
        if key.is_empty() {
            return Err(CliError::Validation {
                field: "set".into(),
                reason: format!("missing field name in '{pair}'"),
            });
        }
        let value = if raw_json {
            serde_json::from_str(raw).map_err(|e| CliError::Validation {
                field: key.into(),
                reason: format!("invalid JSON value '{raw}': {e}"),
            })?
        } else {
            Value::String(raw.to_owned())
        };
        fields.insert(key.to_owned(), value);
    }
    Ok(fields)
}

/// Deserialize collected fields into a typed draft, naming the problem
/// field on failure.
pub fn parse_draft<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, CliError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| CliError::Validation {
        field: "record".into(),
        reason: e.to_string(),
    })
}

/// Parse a record ID argument.
pub fn entity_id(raw: &str) -> EntityId {
    EntityId::from(raw.trim())
}
