//! Command dispatch: bridges CLI args -> core tables -> output formatting.

pub mod auth;
pub mod columns;
pub mod config_cmd;
pub mod dashboard;
pub mod resources;
pub mod spots;
pub mod util;

use parkly_core::{Payment, Reservation, User};

use crate::cli::Command;
use crate::context::Context;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Logout => auth::logout(ctx),
        Command::Whoami => auth::whoami(ctx),
        Command::Dashboard => dashboard::handle(ctx).await,
        Command::Users(args) => resources::handle::<User>(ctx, args.command).await,
        Command::Spots(args) => spots::handle(ctx, args.command).await,
        Command::Payments(args) => resources::handle::<Payment>(ctx, args.command).await,
        Command::Reservations(args) => resources::handle::<Reservation>(ctx, args.command).await,
        // Local commands are handled before dispatch
        Command::Config(_) | Command::Columns(_) | Command::Completions(_) => unreachable!(),
    }
}
