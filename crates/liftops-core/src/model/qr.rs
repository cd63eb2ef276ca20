// QR session grant.

use std::fmt;

use super::ids::ElevatorId;

/// Opaque session token issued by the QR gate. Passed through to the
/// start/complete calls unchanged and never cached beyond the single
/// operation it authorizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrToken(pub String);

impl QrToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QrToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Opaque on purpose; don't leak the token into logs.
        write!(f, "<qr-session>")
    }
}

/// A short-lived authorization to start or complete one maintenance
/// visit on one elevator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrGrant {
    pub token: QrToken,
    pub elevator_id: ElevatorId,
}
