use thiserror::Error;

/// Top-level error type for the `parkly-api` crate.
///
/// Covers every failure mode of the gateway: authentication, transport,
/// backend rejections, decoding, and durable token storage.
/// `parkly-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend answered 401 on an authenticated call. Terminal:
    /// the session has already been cleared when callers see this.
    #[error("Session expired -- log in again")]
    AuthExpired,

    /// Login was rejected (wrong credentials, missing token in response).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout, or another transport fault.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header value rejected by the HTTP stack (locale, token).
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-success status other than 401.
    #[error("Backend rejected request (HTTP {status}): {message}")]
    Http {
        status: u16,
        message: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Storage ─────────────────────────────────────────────────────
    /// Durable token storage could not be read or written.
    #[error("Token storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns `true` if the backend reported the session as no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Returns `true` if the request never produced a response in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
