//! Shared configuration for the parkly console.
//!
//! TOML profiles merged with `PARKLY_` environment variables, saved column
//! preferences, translation to `parkly_api::TransportConfig`, and the
//! durable token stores backing the session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use parkly_api::{TlsMode, TransportConfig};
use parkly_core::{ColumnVisibility, ResourceKind};

pub mod storage;

pub use storage::{FileTokenStorage, KeyringTokenStorage, open_token_storage};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "PARKLY_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Column visibility overrides per resource kind (`users`,
    /// `parking-spots`, ...). Only columns differing from the defaults
    /// are stored.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, BTreeMap<String, bool>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
            columns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Overrides the per-kind page size when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            page_size: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Where a profile's session tokens are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStore {
    /// JSON file in the platform data directory.
    #[default]
    File,
    /// System keyring.
    Keyring,
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL (e.g., "https://api.parkly.uz/api/v1/").
    pub api_url: String,

    /// `Accept-Language` sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Override the global timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Nominatim-compatible geocoder base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoder_url: Option<String>,

    #[serde(default)]
    pub token_store: TokenStore,
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            locale: None,
            timeout: None,
            insecure: None,
            ca_cert: None,
            geocoder_url: None,
            token_store: TokenStore::default(),
        }
    }

    /// Parsed API base URL. Only http and https are accepted.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("api_url", &self.api_url)
    }

    /// Parsed geocoder URL, if one is configured.
    pub fn geocoder_url(&self) -> Result<Option<Url>, ConfigError> {
        self.geocoder_url
            .as_deref()
            .map(|raw| parse_http_url("geocoder_url", raw))
            .transpose()
    }

    /// Transport settings from this profile, falling back to `defaults`.
    pub fn transport(&self, defaults: &Defaults) -> TransportConfig {
        let tls = if self.insecure.unwrap_or(false) {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        let mut transport = TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)),
            ..TransportConfig::default()
        };
        if let Some(ref locale) = self.locale {
            transport.locale.clone_from(locale);
        }
        transport
    }
}

fn parse_http_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

// ── Profile and column resolution ───────────────────────────────────

impl Config {
    /// Active profile name: explicit choice, then `default_profile`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated profile names, or "(none)".
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }

    /// Column state for `kind`: defaults with saved overrides applied.
    pub fn column_visibility(&self, kind: ResourceKind) -> ColumnVisibility {
        let mut columns = ColumnVisibility::for_kind(kind);
        if let Some(saved) = self.columns.get(&kind.to_string()) {
            columns.apply_overrides(saved.iter().map(|(k, v)| (k.as_str(), *v)));
        }
        columns
    }

    /// Remember `columns` for `kind`. A selection equal to the defaults
    /// removes the entry.
    pub fn set_column_visibility(&mut self, kind: ResourceKind, columns: &ColumnVisibility) {
        let overrides = columns.overrides();
        if overrides.is_empty() {
            self.columns.remove(&kind.to_string());
        } else {
            self.columns.insert(kind.to_string(), overrides);
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "parkly", "parkly")
}

/// Resolve the config file path: `PARKLY_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding per-profile session files.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Session file for a profile when `token_store = "file"`.
pub fn session_path(profile_name: &str) -> PathBuf {
    data_dir()
        .join("sessions")
        .join(format!("{profile_name}.json"))
}

fn dirs_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("parkly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields the
/// defaults. Nested keys use a double underscore:
/// `PARKLY_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PARKLY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "staging"

[defaults]
output = "json"
page_size = 25

[profiles.staging]
api_url = "https://staging.parkly.test/api/"
locale = "ru"
timeout = 5
token_store = "keyring"

[profiles.local]
api_url = "http://localhost:3000/"
insecure = true

[columns.parking-spots]
longitude = true
address = false
"#;

    fn sample() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let cfg = load_config_from(&path).unwrap();
        (dir, cfg)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.timeout, 30);
    }

    #[test]
    fn file_values_are_merged() {
        let (_dir, cfg) = sample();
        assert_eq!(cfg.active_profile_name(None), "staging");
        assert_eq!(cfg.active_profile_name(Some("local")), "local");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.defaults.page_size, Some(25));

        let staging = cfg.profile("staging").unwrap();
        assert_eq!(staging.token_store, TokenStore::Keyring);
        assert_eq!(cfg.profile("local").unwrap().token_store, TokenStore::File);
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let (_dir, cfg) = sample();
        let err = cfg.profile("prod").unwrap_err();
        assert_eq!(
            err.to_string(),
            "profile 'prod' not found (available: local, staging)"
        );
    }

    #[test]
    fn transport_prefers_profile_values() {
        let (_dir, cfg) = sample();
        let staging = cfg.profile("staging").unwrap().transport(&cfg.defaults);
        assert_eq!(staging.timeout, Duration::from_secs(5));
        assert_eq!(staging.locale, "ru");
        assert!(matches!(staging.tls, TlsMode::System));

        let local = cfg.profile("local").unwrap().transport(&cfg.defaults);
        assert_eq!(local.timeout, Duration::from_secs(30));
        assert_eq!(local.locale, parkly_api::transport::DEFAULT_LOCALE);
        assert!(matches!(local.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn base_url_rejects_other_schemes() {
        assert!(Profile::new("ftp://example.com").base_url().is_err());
        assert!(Profile::new("not a url").base_url().is_err());
        assert!(Profile::new("https://example.com/api/").base_url().is_ok());
    }

    #[test]
    fn saved_columns_are_applied() {
        let (_dir, cfg) = sample();
        let columns = cfg.column_visibility(ResourceKind::ParkingSpots);
        assert!(columns.is_visible("longitude"));
        assert!(!columns.is_visible("address"));
        assert!(columns.is_visible("location_name"));

        let users = cfg.column_visibility(ResourceKind::Users);
        assert!(users.is_all_selected());
    }

    #[test]
    fn column_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("https://api.test/"));
        let mut columns = cfg.column_visibility(ResourceKind::Payments);
        columns.toggle("transaction_id");
        cfg.set_column_visibility(ResourceKind::Payments, &columns);
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let restored = loaded.column_visibility(ResourceKind::Payments);
        assert!(!restored.is_visible("transaction_id"));
        assert_eq!(loaded.profile("default").unwrap().api_url, "https://api.test/");

        columns.reset();
        let mut cfg = loaded;
        cfg.set_column_visibility(ResourceKind::Payments, &columns);
        assert!(cfg.columns.is_empty());
    }
}
