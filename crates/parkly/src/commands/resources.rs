//! Generic list / get / create / update / delete over one resource table.

use std::io::IsTerminal;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use parkly_core::{ACTIONS_COLUMN, Outcome, Resource, ResourceKind, ResourceTable, Summary};

use crate::cli::{DraftArgs, ListArgs, OutputFormat, ResourceCommand};
use crate::commands::util;
use crate::context::Context;
use crate::error::{CliError, command_name};
use crate::output::{self, Palette};

pub async fn handle<R>(ctx: &Context, cmd: ResourceCommand) -> Result<(), CliError>
where
    R: Resource,
    R::Draft: DeserializeOwned,
    R::Update: DeserializeOwned,
{
    ctx.require_login()?;
    let mut table = ResourceTable::<R>::new(Arc::clone(&ctx.gateway));

    match cmd {
        ResourceCommand::List(args) => list(ctx, table, &args).await,

        ResourceCommand::Get { id } => {
            let entity = util::entity_id(&id);
            let result = table.fetch(&entity).await;
            ctx.check_expired()?;
            let record = result.map_err(|e| CliError::for_record(e, R::KIND, &id))?;

            let out = output::render_single(ctx.output, &record, record_detail::<R>, |r| {
                r.id().to_string()
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ResourceCommand::Create(args) => {
            let mut fields = util::draft_fields(&args)?;
            if R::KIND == ResourceKind::Users {
                prompt_password(&mut fields)?;
            }
            let draft: R::Draft = util::parse_draft(fields)?;

            let result = table.create(&draft).await.map_err(CliError::from);
            finish_mutation(ctx, &mut table, result)
        }

        ResourceCommand::Update { id, draft } => {
            let update: R::Update = parse_update(&draft)?;
            let entity = util::entity_id(&id);

            let result = table
                .update(&entity, &update)
                .await
                .map_err(|e| CliError::for_record(e, R::KIND, &id));
            finish_mutation(ctx, &mut table, result)
        }

        ResourceCommand::Delete { id } => {
            let outcome = delete(ctx, &mut table, &id).await;
            let cancelled = matches!(outcome, Ok(Outcome::Cancelled));
            finish_mutation(ctx, &mut table, outcome.map(|_| ()))?;
            if cancelled && !ctx.quiet {
                eprintln!("Cancelled");
            }
            Ok(())
        }
    }
}

// ── List ─────────────────────────────────────────────────────────────

async fn list<R: Resource>(
    ctx: &Context,
    table: ResourceTable<R>,
    args: &ListArgs,
) -> Result<(), CliError> {
    let mut table = table.with_page_size(ctx.page_size::<R>(args.page_size));

    let spinner = output::spinner(&format!("Loading {}", R::KIND), ctx.quiet);
    let result = table.load().await;
    output::finish(spinner);
    ctx.check_expired()?;
    result?;

    if let Some(ref text) = args.search {
        table.search(text);
    }

    let page_index = usize::try_from(args.page.saturating_sub(1)).unwrap_or(usize::MAX);
    let rows = if args.all {
        table.filtered()
    } else {
        table.page(page_index)
    };

    let columns = ctx.config.column_visibility(R::KIND);
    let body = output::render_records(ctx.output, &rows, &columns)?;

    if ctx.output == OutputFormat::Table {
        let mut out = summary_line(&table.summary(), ctx.palette);
        out.push('\n');
        out.push_str(&body);
        if !args.all {
            out.push('\n');
            out.push_str(&ctx.palette.muted(&format!(
                "Page {}/{} · {} matching",
                page_index.saturating_add(1),
                table.page_count(),
                table.filtered().len()
            )));
        }
        output::print_output(&out, ctx.quiet);
    } else {
        output::print_output(&body, ctx.quiet);
    }
    Ok(())
}

fn summary_line(summary: &Summary, palette: Palette) -> String {
    let mut parts = vec![palette.heading(&format!("Total: {}", summary.total))];
    parts.extend(summary.counts.iter().map(|(k, n)| format!("{k}: {n}")));
    parts.join("  ")
}

// ── Single-record view ───────────────────────────────────────────────

/// Every column of the record, hidden ones included.
fn record_detail<R: Resource>(record: &R) -> String {
    let rows: Vec<_> = R::KIND
        .columns()
        .iter()
        .filter(|c| c.key != ACTIONS_COLUMN)
        .map(|c| (c.label, record.cell(c.key)))
        .collect();
    output::render_pairs(&rows)
}

// ── Mutations ────────────────────────────────────────────────────────

fn parse_update<T: DeserializeOwned>(args: &DraftArgs) -> Result<T, CliError> {
    let fields = util::draft_fields(args)?;
    if fields.is_empty() {
        return Err(CliError::Validation {
            field: "record".into(),
            reason: "no fields given; use --from-file or --set".into(),
        });
    }
    util::parse_draft(fields)
}

fn prompt_password(fields: &mut Map<String, Value>) -> Result<(), CliError> {
    if fields.contains_key("password") || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    let password =
        rpassword::prompt_password("Password for the new user: ").map_err(util::prompt_err)?;
    fields.insert("password".into(), Value::String(password));
    Ok(())
}

fn finish_mutation<R: Resource>(
    ctx: &Context,
    table: &mut ResourceTable<R>,
    result: Result<(), CliError>,
) -> Result<(), CliError> {
    let notifications = table.take_notifications();
    ctx.check_expired()?;
    result?;
    output::print_notifications(&notifications, ctx.palette, ctx.quiet);
    Ok(())
}

async fn delete<R: Resource>(
    ctx: &Context,
    table: &mut ResourceTable<R>,
    id: &str,
) -> Result<Outcome, CliError> {
    if !ctx.yes && !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: format!("{} delete", command_name(R::KIND)),
        });
    }

    let yes = ctx.yes;
    let confirm = move |prompt: &str| -> bool {
        // A failed prompt counts as "no".
        util::confirm(prompt, yes, "delete").unwrap_or(false)
    };
    table
        .delete(&util::entity_id(id), &confirm)
        .await
        .map_err(|e| CliError::for_record(e, R::KIND, id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parkly_core::{CategoryCounts, Payment};
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_line_lists_counts_in_order() {
        let mut counts = CategoryCounts::new();
        counts.insert("pending".into(), 2);
        counts.insert("completed".into(), 5);
        let line = summary_line(&Summary { total: 7, counts }, Palette::new(false));
        assert_eq!(line, "Total: 7  pending: 2  completed: 5");
    }

    #[test]
    fn detail_includes_hidden_columns_but_not_actions() {
        let payment: Payment = serde_json::from_value(json!({
            "id": 3, "amount": 15000, "payment_method": "card",
            "payment_status": "completed", "transaction_id": "tx-1"
        }))
        .unwrap();
        let out = record_detail(&payment);
        assert!(out.contains("Transaction"));
        assert!(out.contains("tx-1"));
        assert!(out.contains("15000"));
        assert!(!out.contains("Actions"));
    }

    #[test]
    fn update_without_fields_is_rejected() {
        let args = DraftArgs {
            from_file: None,
            fields: Vec::new(),
        };
        let err = parse_update::<parkly_core::PaymentDraft>(&args).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
