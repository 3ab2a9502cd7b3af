//! Dashboard handler.

use parkly_core::{CategoryCounts, DashboardSnapshot, fetch_snapshot, format_number};

use crate::context::Context;
use crate::error::CliError;
use crate::output::{self, Palette};

fn breakdown(counts: &CategoryCounts) -> String {
    counts
        .iter()
        .map(|(category, n)| format!("{category}: {n}"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn render_dashboard(snap: &DashboardSnapshot, palette: Palette) -> String {
    let parking = &snap.parking;
    let rows = vec![
        vec![
            "Users".to_owned(),
            snap.users.total.to_string(),
            breakdown(&snap.users.by_role),
        ],
        vec![
            "Parking spots".to_owned(),
            parking.total.to_string(),
            breakdown(&parking.by_type),
        ],
        vec![
            "Free places".to_owned(),
            format!("{} / {}", parking.available.all(), parking.capacity.all()),
            format!(
                "B: {}/{}  C: {}/{}  EV: {}/{}",
                parking.available.b,
                parking.capacity.b,
                parking.available.c,
                parking.capacity.c,
                parking.available.ev,
                parking.capacity.ev
            ),
        ],
        vec![
            "Payments".to_owned(),
            snap.payments.total.to_string(),
            breakdown(&snap.payments.by_status),
        ],
        vec![
            "Revenue".to_owned(),
            format_number(snap.payments.total_amount),
            String::new(),
        ],
        vec![
            "Reservations".to_owned(),
            snap.reservations.total.to_string(),
            breakdown(&snap.reservations.by_status),
        ],
    ];

    let mut out = output::render_grid(&["", "Total", "Breakdown"], rows);
    if !snap.degraded.is_empty() {
        let names = snap
            .degraded
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push('\n');
        out.push_str(&palette.muted(&format!("Could not load: {names} (shown as empty)")));
    }
    out
}

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    ctx.require_login()?;

    let spinner = output::spinner("Loading dashboard", ctx.quiet);
    let snap = fetch_snapshot(&ctx.gateway).await;
    output::finish(spinner);
    ctx.check_expired()?;

    let out = output::render_single(
        ctx.output,
        &snap,
        |s| render_dashboard(s, ctx.palette),
        |s| {
            format!(
                "{} {} {} {}",
                s.users.total, s.parking.total, s.payments.total, s.reservations.total
            )
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
