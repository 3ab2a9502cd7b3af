//! Login, logout and whoami handlers.

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use parkly_api::{Credentials, Identity, Route};

use crate::cli::LoginArgs;
use crate::commands::util::prompt_err;
use crate::context::Context;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct WhoAmI<'a> {
    profile: &'a str,
    api_url: &'a str,
    #[serde(flatten)]
    identity: &'a Identity,
}

fn detail(who: &WhoAmI<'_>) -> String {
    output::render_pairs(&[
        ("Name", who.identity.name.clone()),
        ("Email", who.identity.email.clone()),
        ("Role", who.identity.role.to_string()),
        ("Profile", who.profile.to_owned()),
        ("API", who.api_url.to_owned()),
    ])
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<(), CliError> {
    let username = match args.username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
    };
    let password = match args.password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
    };

    if username.trim().is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let credentials = Credentials {
        username: username.trim().to_owned(),
        password: SecretString::from(password),
    };

    let spinner = output::spinner("Logging in", ctx.quiet);
    let result = ctx.gateway.login(&credentials).await;
    output::finish(spinner);
    let identity = result?;
    ctx.navigator.redirect(Route::Dashboard);

    if !ctx.quiet {
        eprintln!(
            "{} Logged in as {} ({}) on profile '{}'",
            ctx.palette.success("✓"),
            identity.name,
            identity.role,
            ctx.profile_name
        );
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<(), CliError> {
    let was_logged_in = ctx.session().is_authenticated();
    ctx.gateway.logout()?;
    if !ctx.quiet {
        if was_logged_in {
            eprintln!("{} Logged out of '{}'", ctx.palette.success("✓"), ctx.profile_name);
        } else {
            eprintln!("Not logged in on '{}'", ctx.profile_name);
        }
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<(), CliError> {
    ctx.require_login()?;
    let identity = ctx.session().identity().ok_or_else(|| CliError::NotLoggedIn {
        profile: ctx.profile_name.clone(),
    })?;

    let who = WhoAmI {
        profile: &ctx.profile_name,
        api_url: ctx.gateway.base_url().as_str(),
        identity: &identity,
    };
    let out = output::render_single(ctx.output, &who, detail, |w| w.identity.email.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
