//! Resolved runtime context for commands that talk to the backend.
//!
//! Combines the config file, the active profile, and `GlobalOpts` flag
//! overrides into one gateway plus the output settings every handler needs.

use std::sync::Arc;

use clap::ValueEnum;
use url::Url;

use parkly_api::geocode::DEFAULT_GEOCODER_URL;
use parkly_api::{
    AuthExpiryInterceptor, Gateway, GeocodingClient, Navigator, Route, SessionStore,
    TransportConfig,
};
use parkly_config::{Config, Profile, config_path, open_token_storage};
use parkly_core::Resource;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{Palette, should_color};

// ── Output settings ──────────────────────────────────────────────────

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Color palette: flag, then `defaults.color`, then auto-detection.
pub fn palette(global: &GlobalOpts, config: &Config) -> Palette {
    let mode = global
        .color
        .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto);
    Palette::new(should_color(mode))
}

// ── Profile resolution ───────────────────────────────────────────────

/// The profile to connect with, after flag overrides.
///
/// With no matching profile, `--api-url` alone is enough to build one.
pub fn resolve_profile(
    config: &Config,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<Profile, CliError> {
    let mut profile = match (config.profiles.get(profile_name), &global.api_url) {
        (Some(profile), _) => profile.clone(),
        (None, Some(url)) => Profile::new(url.clone()),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name.into(),
                available: config.available_profiles(),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if let Some(ref locale) = global.locale {
        profile.locale = Some(locale.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok(profile)
}

// ── Context ──────────────────────────────────────────────────────────

pub struct Context {
    pub config: Config,
    pub profile_name: String,
    pub output: OutputFormat,
    pub palette: Palette,
    pub quiet: bool,
    pub yes: bool,
    pub navigator: Arc<Navigator>,
    pub gateway: Arc<Gateway>,
    transport: TransportConfig,
    geocoder_url: Option<Url>,
}

impl Context {
    pub fn build(config: Config, global: &GlobalOpts) -> Result<Self, CliError> {
        let profile_name = config.active_profile_name(global.profile.as_deref());
        let profile = resolve_profile(&config, &profile_name, global)?;

        let base_url = profile.base_url()?;
        let geocoder_url = profile.geocoder_url()?;
        let transport = profile.transport(&config.defaults);

        let session = Arc::new(SessionStore::load(open_token_storage(
            &profile_name,
            &profile,
        ))?);
        let navigator = Arc::new(Navigator::default());
        let gateway = Gateway::new(base_url.as_str(), &transport, Arc::clone(&session))?
            .with_interceptor(Arc::new(AuthExpiryInterceptor::new(
                session,
                Arc::clone(&navigator),
            )));

        tracing::debug!(
            profile = %profile_name,
            url = %base_url,
            timeout = ?transport.timeout,
            locale = %transport.locale,
            "context resolved"
        );

        Ok(Self {
            output: output_format(global, &config),
            palette: palette(global, &config),
            quiet: global.quiet,
            yes: global.yes,
            config,
            profile_name,
            navigator,
            gateway: Arc::new(gateway),
            transport,
            geocoder_url,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.gateway.session()
    }

    /// Fail early when no session is stored for the profile.
    pub fn require_login(&self) -> Result<(), CliError> {
        if self.session().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotLoggedIn {
                profile: self.profile_name.clone(),
            })
        }
    }

    /// `SessionExpired` if any call so far hit a 401.
    pub fn check_expired(&self) -> Result<(), CliError> {
        if self.navigator.current() == Route::Login {
            Err(CliError::SessionExpired)
        } else {
            Ok(())
        }
    }

    /// Rows per page for `R`: flag, then `defaults.page_size`, then the
    /// table's own size.
    pub fn page_size<R: Resource>(&self, flag: Option<u32>) -> usize {
        flag.and_then(|n| usize::try_from(n).ok())
            .or(self.config.defaults.page_size)
            .unwrap_or_else(|| R::KIND.page_size())
    }

    pub fn geocoder(&self) -> Result<GeocodingClient, CliError> {
        let url = self
            .geocoder_url
            .as_ref()
            .map_or(DEFAULT_GEOCODER_URL, Url::as_str);
        Ok(GeocodingClient::new(url, &self.transport)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["parkly"];
        argv.extend_from_slice(args);
        argv.push("whoami");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn api_url_flag_builds_a_profile() {
        let cfg = Config::default();
        let g = global(&["--api-url", "http://localhost:8080/api", "--timeout", "5"]);
        let profile = resolve_profile(&cfg, "default", &g).unwrap();
        assert_eq!(profile.api_url, "http://localhost:8080/api");
        assert_eq!(profile.timeout, Some(5));
    }

    #[test]
    fn missing_profile_without_url_is_no_config() {
        let cfg = Config::default();
        let err = resolve_profile(&cfg, "default", &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn unknown_explicit_profile_is_reported_by_name() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("prod".into(), Profile::new("https://api.example.com"));
        let err = resolve_profile(&cfg, "staging", &global(&["-p", "staging"])).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "staging"));
    }

    #[test]
    fn flags_override_profile_values() {
        let mut cfg = Config::default();
        let mut p = Profile::new("https://api.example.com");
        p.locale = Some("ru".into());
        cfg.profiles.insert("default".into(), p);

        let profile = resolve_profile(&cfg, "default", &global(&["--locale", "en", "-k"])).unwrap();
        assert_eq!(profile.api_url, "https://api.example.com");
        assert_eq!(profile.locale.as_deref(), Some("en"));
        assert_eq!(profile.insecure, Some(true));
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "json"]), &cfg),
            OutputFormat::Json
        );
    }
}
