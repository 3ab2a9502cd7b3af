// ── Core error types ──
//
// User-facing errors from parkly-core. The `From<parkly_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants;
// raw JSON bodies stay behind.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client-side validation ───────────────────────────────────────
    /// Rejected before any request was issued.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Session expired -- log in again")]
    AuthExpired,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Network error: {reason}")]
    Network { reason: String, timed_out: bool },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Backend rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<parkly_api::Error> for CoreError {
    fn from(err: parkly_api::Error) -> Self {
        match err {
            parkly_api::Error::AuthExpired => CoreError::AuthExpired,
            parkly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            parkly_api::Error::Network(ref e) => CoreError::Network {
                reason: e.to_string(),
                timed_out: e.is_timeout(),
            },
            parkly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            parkly_api::Error::InvalidHeader(msg) => CoreError::Config {
                message: format!("Invalid header: {msg}"),
            },
            parkly_api::Error::Tls(msg) => CoreError::Network {
                reason: format!("TLS error: {msg}"),
                timed_out: false,
            },
            parkly_api::Error::Http {
                status: 404,
                message,
                ..
            } => CoreError::NotFound {
                identifier: message,
            },
            parkly_api::Error::Http {
                status, message, ..
            } => CoreError::Rejected { status, message },
            parkly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
            parkly_api::Error::Storage(msg) => CoreError::Config {
                message: format!("Token storage: {msg}"),
            },
        }
    }
}
