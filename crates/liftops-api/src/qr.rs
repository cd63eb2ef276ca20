// QR session endpoints.
//
// Exchange a scanned code (or an admin remote-start claim) for a
// short-lived session token. The elevator-binding check on the returned
// grant happens in `liftops-core`'s gate, not here.

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::QrGrantDto;

impl ApiClient {
    /// Verify a scanned/typed code server-side and obtain a session token
    /// bound to `elevator_id`.
    pub async fn validate_qr(&self, code: &str, elevator_id: i64) -> Result<QrGrantDto, Error> {
        debug!(elevator_id, "validating QR code");
        let body = json!({
            "qrCode": code,
            "elevatorId": elevator_id,
        });
        self.post("qr-sessions/validate", &body).await
    }

    /// Obtain a session token without a physical code.
    ///
    /// Role-gated server-side (and pre-checked in the core gate): only a
    /// PATRON may start remotely.
    pub async fn remote_start(&self, elevator_id: i64) -> Result<QrGrantDto, Error> {
        debug!(elevator_id, "requesting remote-start session");
        let body = json!({ "elevatorId": elevator_id });
        self.post("qr-sessions/remote-start", &body).await
    }
}
