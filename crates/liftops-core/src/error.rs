// ── Core error types ──
//
// User-facing errors from liftops-core. Consumers never see HTTP status
// codes or transport exceptions directly -- the `From<liftops_api::Error>`
// impl translates pipeline errors into domain-appropriate variants, and
// guard violations name the specific invariant so the operator can
// correct the input (pick another date, rescan the right elevator's code,
// add more photos).

use chrono::NaiveDate;
use thiserror::Error;

use liftops_api::ErrorKind;

use crate::lifecycle::PlanEvent;
use crate::model::{ElevatorId, PlanId, PlanStatus, Role};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- sign in again")]
    SessionExpired,

    // ── Authorization errors ─────────────────────────────────────────
    #[error("This operation requires the {required:?} role")]
    RoleRequired { required: Role },

    #[error("QR session is bound to elevator {got}, not elevator {expected}")]
    ElevatorMismatch {
        expected: ElevatorId,
        got: ElevatorId,
    },

    #[error("Not authorized: {message}")]
    NotAuthorized { message: String },

    // ── Lifecycle guard violations ───────────────────────────────────
    #[error("Elevator {elevator_id} already has an active plan in {month}")]
    ScheduleConflict {
        elevator_id: ElevatorId,
        month: String,
    },

    #[error("Planned date {date} is in the past")]
    PastDate { date: NaiveDate },

    #[error("Completion needs at least {required} photos, got {got}")]
    InsufficientPhotos { required: u32, got: u32 },

    #[error("Cannot {event} a plan in status {from:?}")]
    InvalidTransition { from: PlanStatus, event: PlanEvent },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Maintenance plan not found: {id}")]
    PlanNotFound { id: PlanId },

    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── Backend errors (wrapped, not exposed raw) ────────────────────
    /// Server-side re-validation refused the operation. Recoverable --
    /// re-fetch plan state and let the operator retry.
    #[error("Operation rejected by backend: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Server error: {message}")]
    Server { message: String },

    #[error("Backend unavailable: {message}")]
    Connection { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Project onto the client-observable taxonomy (shared with the api
    /// crate) for per-screen handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated | Self::AuthenticationFailed { .. } | Self::SessionExpired => {
                ErrorKind::Authentication
            }
            Self::RoleRequired { .. }
            | Self::ElevatorMismatch { .. }
            | Self::NotAuthorized { .. } => ErrorKind::Authorization,
            Self::ScheduleConflict { .. }
            | Self::PastDate { .. }
            | Self::InsufficientPhotos { .. }
            | Self::InvalidTransition { .. }
            | Self::ValidationFailed { .. } => ErrorKind::Validation,
            Self::PlanNotFound { .. } | Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Server { .. } => ErrorKind::ServerError,
            Self::Connection { .. } => ErrorKind::NetworkError,
            Self::Rejected { .. } | Self::Internal(_) => ErrorKind::Unknown,
        }
    }

    /// A rejected transition is recoverable: refetch and let the operator
    /// try again. Session-terminal errors are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }
}

// ── Conversion from pipeline errors ──────────────────────────────────

impl From<liftops_api::Error> for CoreError {
    fn from(err: liftops_api::Error) -> Self {
        match err {
            liftops_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            liftops_api::Error::SessionExpired => CoreError::SessionExpired,
            liftops_api::Error::InvalidToken { message } => {
                CoreError::AuthenticationFailed { message }
            }
            liftops_api::Error::Authorization { message } => CoreError::NotAuthorized { message },
            liftops_api::Error::Validation { message, errors } => {
                let message = if errors.is_empty() {
                    message
                } else {
                    format!("{message} ({})", errors.join("; "))
                };
                CoreError::ValidationFailed { message }
            }
            liftops_api::Error::NotFound { message } => CoreError::NotFound { message },
            liftops_api::Error::Server { status, message } => CoreError::Server {
                message: format!("HTTP {status}: {message}"),
            },
            liftops_api::Error::Api { message } => CoreError::Rejected { message },
            liftops_api::Error::Transport(e) => CoreError::Connection {
                message: e.to_string(),
            },
            liftops_api::Error::Tls(message) => CoreError::Connection { message },
            liftops_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            liftops_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
