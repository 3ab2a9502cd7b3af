//! Parking-spot handlers: the shared table commands plus images,
//! availability, nearby search, and geocoding.

use std::path::Path;
use std::sync::Arc;

use parkly_api::Coordinates;
use parkly_core::{
    AvailabilityUpdate, NearbyQuery, NearbySpot, ParkingSpot, ParkingSpotDetail, ResourceKind,
    ResourceTable, format_number,
};

use crate::cli::SpotsCommand;
use crate::commands::{resources, util};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

const KIND: ResourceKind = ResourceKind::ParkingSpots;

pub async fn handle(ctx: &Context, cmd: SpotsCommand) -> Result<(), CliError> {
    if let SpotsCommand::Common(cmd) = cmd {
        return resources::handle::<ParkingSpot>(ctx, cmd).await;
    }
    if let SpotsCommand::Geocode { query } = cmd {
        return geocode(ctx, &query.join(" ")).await;
    }

    ctx.require_login()?;
    let mut table = ResourceTable::<ParkingSpot>::new(Arc::clone(&ctx.gateway));

    match cmd {
        SpotsCommand::Detail { id } => {
            let result = table.detail(&util::entity_id(&id)).await;
            ctx.check_expired()?;
            let detail = result.map_err(|e| CliError::for_record(e, KIND, &id))?;
            print_detail(ctx, &detail)
        }

        SpotsCommand::UploadImage { id, file } => {
            let file_name = file_name(&file)?;
            let bytes = std::fs::read(&file)?;

            let spinner = output::spinner(&format!("Uploading {file_name}"), ctx.quiet);
            let result = table
                .upload_image(&util::entity_id(&id), &file_name, bytes)
                .await;
            output::finish(spinner);
            after_image_change(ctx, &mut table, &id, result)
        }

        SpotsCommand::DeleteImage { id, file_name } => {
            let prompt = format!("Delete image {file_name} of spot {id}?");
            if !util::confirm(&prompt, ctx.yes, "spots delete-image")? {
                if !ctx.quiet {
                    eprintln!("Cancelled");
                }
                return Ok(());
            }
            let result = table
                .delete_image(&util::entity_id(&id), &file_name)
                .await;
            after_image_change(ctx, &mut table, &id, result)
        }

        SpotsCommand::Availability {
            id,
            b_spots,
            c_spots,
        } => {
            let result = table
                .update_availability(&util::entity_id(&id), AvailabilityUpdate { b_spots, c_spots })
                .await
                .map_err(|e| CliError::for_record(e, KIND, &id));
            let notifications = table.take_notifications();
            ctx.check_expired()?;
            result?;
            output::print_notifications(&notifications, ctx.palette, ctx.quiet);
            Ok(())
        }

        SpotsCommand::Nearby {
            radius,
            longitude,
            latitude,
            address,
        } => {
            let centre = match (longitude, latitude, address) {
                (Some(longitude), Some(latitude), _) => Coordinates {
                    latitude,
                    longitude,
                },
                (_, _, Some(address)) => lookup(ctx, &address).await?,
                _ => {
                    return Err(CliError::Validation {
                        field: "nearby".into(),
                        reason: "pass --longitude and --latitude, or --address".into(),
                    });
                }
            };

            let query = NearbyQuery {
                radius,
                longitude: centre.longitude,
                latitude: centre.latitude,
            };
            let result = table.nearby(query).await;
            ctx.check_expired()?;
            let spots = result?;

            let out = output::render_single(ctx.output, &spots, |s| render_nearby(s), |s| {
                s.iter()
                    .map(|n| n.spot.id.to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        SpotsCommand::Common(_) | SpotsCommand::Geocode { .. } => unreachable!(),
    }
}

// ── Images ───────────────────────────────────────────────────────────

fn file_name(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::Validation {
            field: "file".into(),
            reason: format!("'{}' has no usable file name", path.display()),
        })
}

fn after_image_change(
    ctx: &Context,
    table: &mut ResourceTable<ParkingSpot>,
    id: &str,
    result: Result<ParkingSpotDetail, parkly_core::CoreError>,
) -> Result<(), CliError> {
    let notifications = table.take_notifications();
    ctx.check_expired()?;
    let detail = result.map_err(|e| CliError::for_record(e, KIND, id))?;
    output::print_notifications(&notifications, ctx.palette, ctx.quiet);
    print_detail(ctx, &detail)
}

// ── Rendering ────────────────────────────────────────────────────────

fn print_detail(ctx: &Context, detail: &ParkingSpotDetail) -> Result<(), CliError> {
    let out = output::render_single(
        ctx.output,
        detail,
        |d| render_detail(d, ctx.palette),
        |d| {
            d.images
                .iter()
                .map(|i| i.image.clone())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn render_detail(detail: &ParkingSpotDetail, palette: output::Palette) -> String {
    let mut out = output::render_pairs(&detail.summary_rows());

    if !detail.images.is_empty() {
        out.push_str("\n\n");
        out.push_str(&palette.heading("Images"));
        out.push('\n');
        out.push_str(&output::render_grid(
            &["ID", "File"],
            detail
                .images
                .iter()
                .map(|i| vec![i.id.to_string(), i.image.clone()])
                .collect(),
        ));
    }

    if !detail.comments.is_empty() {
        out.push_str("\n\n");
        out.push_str(&palette.heading("Reviews"));
        out.push('\n');
        out.push_str(&output::render_grid(
            &["User", "Rating", "Comment", "Created"],
            detail
                .comments
                .iter()
                .map(|c| {
                    vec![
                        c.user_id.clone().unwrap_or_default(),
                        c.rating.map(format_number).unwrap_or_default(),
                        c.comment.clone().unwrap_or_default(),
                        c.created_at.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        ));
    }
    out
}

fn render_nearby(spots: &[NearbySpot]) -> String {
    output::render_grid(
        &["ID", "Location", "Address", "Distance (km)", "B free", "C free", "EV free"],
        spots
            .iter()
            .map(|n| {
                let s = &n.spot;
                vec![
                    s.id.to_string(),
                    s.location_name.clone().unwrap_or_default(),
                    s.address.clone().unwrap_or_default(),
                    n.distance.map(format_number).unwrap_or_default(),
                    s.b_available_spots.to_string(),
                    s.c_available_spots.to_string(),
                    s.ev_available_spots.to_string(),
                ]
            })
            .collect(),
    )
}

// ── Geocoding ────────────────────────────────────────────────────────

async fn lookup(ctx: &Context, address: &str) -> Result<Coordinates, CliError> {
    let client = ctx.geocoder()?;
    let spinner = output::spinner("Looking up address", ctx.quiet);
    let found = client.lookup(address).await;
    output::finish(spinner);
    found.ok_or_else(|| CliError::Validation {
        field: "address".into(),
        reason: format!("no location found for '{address}'; pass coordinates instead"),
    })
}

async fn geocode(ctx: &Context, query: &str) -> Result<(), CliError> {
    let coords = lookup(ctx, query).await?;
    let out = output::render_single(
        ctx.output,
        &coords,
        |c| {
            output::render_pairs(&[
                ("Latitude", c.latitude.to_string()),
                ("Longitude", c.longitude.to_string()),
            ])
        },
        |c| format!("{} {}", c.longitude, c.latitude),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
