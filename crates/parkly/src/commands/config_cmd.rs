//! Config subcommand handlers.

use dialoguer::{Input, Select};

use parkly_api::transport::DEFAULT_LOCALE;
use parkly_config::{Config, Profile, TokenStore, config_path, load_config, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::prompt_err;
use crate::context::output_format;
use crate::error::CliError;
use crate::output;

const PROFILE_KEYS: &str = "api_url, locale, timeout, insecure, ca_cert, geocoder_url, token_store";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    if let Some(page_size) = cfg.defaults.page_size {
        let _ = writeln!(out, "page_size = {page_size}");
    }

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref locale) = p.locale {
            let _ = writeln!(out, "locale = \"{locale}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(ref geocoder) = p.geocoder_url {
            let _ = writeln!(out, "geocoder_url = \"{geocoder}\"");
        }
        let _ = writeln!(out, "token_store = \"{}\"", token_store_name(p.token_store));
    }

    for (table, overrides) in &cfg.columns {
        let _ = writeln!(out);
        let _ = writeln!(out, "[columns.{table}]");
        for (key, visible) in overrides {
            let _ = writeln!(out, "{key} = {visible}");
        }
    }

    out
}

fn token_store_name(store: TokenStore) -> &'static str {
    match store {
        TokenStore::File => "file",
        TokenStore::Keyring => "keyring",
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

/// Apply one `config set` key to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            let candidate = Profile::new(value);
            candidate.base_url()?;
            profile.api_url = candidate.api_url;
        }
        "locale" => profile.locale = Some(value),
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        "insecure" => profile.insecure = Some(parse_bool("insecure", &value)?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "geocoder_url" | "geocoder-url" => {
            let mut candidate = Profile::new(String::new());
            candidate.geocoder_url = Some(value);
            candidate.geocoder_url()?;
            profile.geocoder_url = candidate.geocoder_url;
        }
        "token_store" | "token-store" => {
            profile.token_store = match value.as_str() {
                "file" => TokenStore::File,
                "keyring" => TokenStore::Keyring,
                _ => {
                    return Err(CliError::Validation {
                        field: "token_store".into(),
                        reason: "must be 'file' or 'keyring'".into(),
                    });
                }
            };
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {PROFILE_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config_path();
            eprintln!("parkly configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API base URL")
                .default("http://localhost:8080/api/v1/".into())
                .interact_text()
                .map_err(prompt_err)?;

            let locale: String = Input::new()
                .with_prompt("Language (Accept-Language)")
                .default(DEFAULT_LOCALE.into())
                .interact_text()
                .map_err(prompt_err)?;

            let store_choices = &[
                "Session file in the data directory",
                "System keyring",
            ];
            let token_store = match Select::new()
                .with_prompt("Where should the login session be kept?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => TokenStore::File,
                _ => TokenStore::Keyring,
            };

            let mut profile = Profile::new(api_url);
            profile.base_url()?;
            profile.locale = (locale != DEFAULT_LOCALE).then_some(locale);
            profile.token_store = token_store;

            let mut cfg = load_config()?;
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: parkly login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = load_config()?;
            let out = output::render_single(output_format(global, &cfg), &cfg, format_config, |_| {
                config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = load_config()?;
            let profile_name = cfg.active_profile_name(global.profile.as_deref());

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            set_profile_key(profile, &key, value)?;

            if profile.api_url.is_empty() {
                return Err(CliError::Validation {
                    field: "api_url".into(),
                    reason: format!(
                        "profile '{profile_name}' has no api_url; set it first with: \
                         parkly config set api_url <URL>"
                    ),
                });
            }

            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = load_config()?;
            let default = cfg.active_profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: parkly config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if *name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.api_url);
                }
            }
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            let mut cfg = load_config()?;
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_validates_urls() {
        let mut p = Profile::new("https://api.example.com");
        assert!(set_profile_key(&mut p, "api_url", "ftp://nope".into()).is_err());
        assert_eq!(p.api_url, "https://api.example.com");

        set_profile_key(&mut p, "api-url", "http://localhost:8080/api".into()).unwrap();
        assert_eq!(p.api_url, "http://localhost:8080/api");
    }

    #[test]
    fn set_parses_typed_values() {
        let mut p = Profile::new("https://api.example.com");
        set_profile_key(&mut p, "timeout", "12".into()).unwrap();
        set_profile_key(&mut p, "insecure", "true".into()).unwrap();
        set_profile_key(&mut p, "token_store", "keyring".into()).unwrap();
        assert_eq!(p.timeout, Some(12));
        assert_eq!(p.insecure, Some(true));
        assert_eq!(p.token_store, TokenStore::Keyring);

        assert!(set_profile_key(&mut p, "timeout", "soon".into()).is_err());
        assert!(set_profile_key(&mut p, "token_store", "vault".into()).is_err());
    }

    #[test]
    fn unknown_key_lists_valid_keys() {
        let mut p = Profile::new("https://api.example.com");
        let err = set_profile_key(&mut p, "site", "x".into()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref reason, .. } if reason.contains("geocoder_url")));
    }

    #[test]
    fn shown_config_includes_column_overrides() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("https://api.example.com"));
        cfg.columns.insert(
            "users".into(),
            [("email".to_owned(), false)].into_iter().collect(),
        );
        let out = format_config(&cfg);
        assert!(out.contains("[profiles.default]"));
        assert!(out.contains("token_store = \"file\""));
        assert!(out.contains("[columns.users]"));
        assert!(out.contains("email = false"));
    }
}
