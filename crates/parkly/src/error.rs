//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use parkly_config::ConfigError;
use parkly_core::{CoreError, ResourceKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(parkly::connection_failed),
        help(
            "Check that the API is running and the URL is right.\n\
             Show the active settings with: parkly config show"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out: {reason}")]
    #[diagnostic(
        code(parkly::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login failed: {message}")]
    #[diagnostic(code(parkly::auth_failed), help("Check the username and password."))]
    AuthFailed { message: String },

    #[error("Not logged in (profile '{profile}')")]
    #[diagnostic(code(parkly::not_logged_in), help("Run: parkly login"))]
    NotLoggedIn { profile: String },

    #[error("Session expired")]
    #[diagnostic(
        code(parkly::session_expired),
        help("The backend rejected the stored token. Run: parkly login")
    )]
    SessionExpired,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(parkly::not_found),
        help("Run: parkly {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Backend rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(parkly::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from the backend: {message}")]
    #[diagnostic(
        code(parkly::unexpected_response),
        help("The API may be a different version than this client expects.")
    )]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(parkly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(parkly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: parkly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(parkly::no_config),
        help(
            "Create a profile with: parkly config init\n\
             Or pass --api-url / set PARKLY_API_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(parkly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(parkly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(parkly::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(parkly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotLoggedIn { .. } | Self::SessionExpired => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Convert a core error raised while working on one record.
    pub fn for_record(err: CoreError, kind: ResourceKind, id: &str) -> Self {
        match err {
            CoreError::NotFound { .. } => CliError::NotFound {
                resource_type: kind.singular().into(),
                identifier: id.into(),
                list_command: format!("{} list", command_name(kind)),
            },
            other => other.into(),
        }
    }
}

/// CLI subcommand for a resource kind.
pub fn command_name(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Users => "users",
        ResourceKind::ParkingSpots => "spots",
        ResourceKind::Payments => "payments",
        ResourceKind::Reservations => "reservations",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::AuthExpired => CliError::SessionExpired,

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Network {
                reason,
                timed_out: true,
            } => CliError::Timeout { reason },

            CoreError::Network { reason, .. } => CliError::ConnectionFailed { reason },

            CoreError::NotFound { identifier } => CliError::NotFound {
                resource_type: "Record".into(),
                identifier,
                list_command: "dashboard".into(),
            },

            CoreError::Rejected { status, message } => CliError::ApiError { status, message },

            CoreError::Decode { message } => CliError::UnexpectedResponse { message },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}

impl From<parkly_api::Error> for CliError {
    fn from(err: parkly_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_session_exits_with_auth_code() {
        let err = CliError::from(CoreError::AuthExpired);
        assert!(matches!(err, CliError::SessionExpired));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn timeouts_and_connection_failures_differ() {
        let timeout = CliError::from(CoreError::Network {
            reason: "deadline".into(),
            timed_out: true,
        });
        let refused = CliError::from(CoreError::Network {
            reason: "refused".into(),
            timed_out: false,
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(refused.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn not_found_names_the_list_command() {
        let err = CliError::for_record(
            CoreError::NotFound {
                identifier: "Not Found".into(),
            },
            ResourceKind::ParkingSpots,
            "7",
        );
        match err {
            CliError::NotFound {
                resource_type,
                identifier,
                list_command,
            } => {
                assert_eq!(resource_type, "Parking spot");
                assert_eq!(identifier, "7");
                assert_eq!(list_command, "spots list");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validation_is_a_usage_error() {
        let err = CliError::from(CoreError::validation("amount", "must not be negative"));
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(err.to_string(), "Invalid value for amount: must not be negative");
    }
}
