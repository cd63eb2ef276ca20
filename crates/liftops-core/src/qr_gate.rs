// ── QR session gate ──
//
// Converts a human-presented proof (scanned code) or an elevated
// privilege claim (admin remote start) into a short-lived grant scoped to
// one elevator. The elevator-binding check lives here, not in the
// lifecycle: a server-accepted code for the wrong elevator is still an
// authorization failure, defending against codes copy-pasted from a
// different cabin.

use std::sync::Arc;

use tracing::debug;

use liftops_api::ApiClient;

use crate::error::CoreError;
use crate::model::{ElevatorId, QrGrant, QrToken, Role, Session};

pub struct QrSessionGate {
    api: Arc<ApiClient>,
}

impl QrSessionGate {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Verify a scanned/typed code server-side and bind the grant to the
    /// expected elevator.
    pub async fn validate(&self, code: &str, elevator_id: ElevatorId) -> Result<QrGrant, CoreError> {
        let dto = self.api.validate_qr(code, elevator_id.0).await?;

        match dto.elevator_id.map(ElevatorId) {
            Some(bound) if bound == elevator_id => {
                debug!(%elevator_id, "QR session granted");
                Ok(QrGrant {
                    token: QrToken(dto.qr_session_token),
                    elevator_id,
                })
            }
            Some(bound) => Err(CoreError::ElevatorMismatch {
                expected: elevator_id,
                got: bound,
            }),
            None => Err(CoreError::NotAuthorized {
                message: "QR session came back unbound to an elevator".into(),
            }),
        }
    }

    /// Issue a grant without a physical code. Patron-only -- an explicit
    /// trust escalation gated by role, re-checked server-side.
    pub async fn remote_start(
        &self,
        session: &Session,
        elevator_id: ElevatorId,
    ) -> Result<QrGrant, CoreError> {
        if !session.role.satisfies(Role::Patron) {
            return Err(CoreError::RoleRequired {
                required: Role::Patron,
            });
        }

        let dto = self.api.remote_start(elevator_id.0).await?;

        // Remote-start grants usually come back unbound; bind them to the
        // elevator that was asked for. A contradicting binding is refused.
        match dto.elevator_id.map(ElevatorId) {
            Some(bound) if bound != elevator_id => Err(CoreError::ElevatorMismatch {
                expected: elevator_id,
                got: bound,
            }),
            _ => {
                debug!(%elevator_id, "remote-start session granted");
                Ok(QrGrant {
                    token: QrToken(dto.qr_session_token),
                    elevator_id,
                })
            }
        }
    }
}
