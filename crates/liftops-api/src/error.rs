use thiserror::Error;

/// Client-observable error taxonomy.
///
/// Screens branch on the kind, never on HTTP status codes or transport
/// details -- those are normalized away at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or expired session.
    Authentication,
    /// Role or QR/elevator mismatch.
    Authorization,
    /// Payload rejected by the backend (or by a client-side guard).
    Validation,
    NotFound,
    ServerError,
    NetworkError,
    Unknown,
}

/// Top-level error type for the `liftops-api` crate.
///
/// Covers every failure mode of the request pipeline: authentication,
/// refresh, transport, and backend envelope errors. `liftops-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No usable access token, or the backend rejected the one we sent.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The refresh exchange was rejected -- the session is over.
    /// No automatic re-login is attempted.
    #[error("Session expired -- sign in again")]
    SessionExpired,

    /// Access token payload could not be decoded into typed claims.
    /// Treated as unauthenticated (fails closed).
    #[error("Invalid access token: {message}")]
    InvalidToken { message: String },

    // ── Authorization ───────────────────────────────────────────────
    /// The backend accepted the session but refused the operation.
    #[error("Not authorized: {message}")]
    Authorization { message: String },

    // ── Backend envelope ────────────────────────────────────────────
    /// Payload rejected (HTTP 400/422), with per-field detail when present.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: Vec<String>,
    },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// `success: false` in a 2xx envelope with no classifiable status.
    #[error("API error: {message}")]
    Api { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Project this error onto the client-observable taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } | Self::SessionExpired | Self::InvalidToken { .. } => {
                ErrorKind::Authentication
            }
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::ServerError,
            Self::Transport(_) | Self::Tls(_) => ErrorKind::NetworkError,
            Self::Api { .. } | Self::InvalidUrl(_) | Self::Deserialization { .. } => {
                ErrorKind::Unknown
            }
        }
    }

    /// Returns `true` if this error means the session is unrecoverable
    /// and the user must sign in again.
    pub fn is_session_terminal(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
