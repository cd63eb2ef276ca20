// Wire types for the liftops backend.
//
// Every response arrives in the `{ success, message, data, errors }`
// envelope; the pipeline strips it before callers see the payload.
// Domain conversion lives in `liftops-core` -- these structs mirror the
// JSON contract and nothing more.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Standard response envelope. `data` is absent on failures and on
/// operations with no payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairDto {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    /// Raw role string; the typed claims parser is the authority on roles.
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserDto,
}

// ── QR sessions ─────────────────────────────────────────────────────

/// A short-lived session token bound to one elevator.
///
/// `elevator_id` is absent on the remote-start path, where the caller
/// already named the elevator and no physical code was scanned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrGrantDto {
    pub qr_session_token: String,
    pub elevator_id: Option<i64>,
}

// ── Maintenance plans ───────────────────────────────────────────────

/// Plan status wire values. `NOT_PLANNED` only ever appears in calendar
/// cells -- no persisted plan is created in that status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatusDto {
    NotPlanned,
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub id: i64,
    pub elevator_id: i64,
    pub template_id: i64,
    pub planned_date: NaiveDate,
    pub status: PlanStatusDto,
    pub note: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
    /// Plan-specific completion-photo minimum; defaults client-side when absent.
    pub min_photos: Option<u32>,
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub elevator_id: i64,
    pub template_id: i64,
    pub planned_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReschedulePlanRequest {
    pub planned_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExecutionRequest {
    pub maintenance_plan_id: i64,
    /// The session token from the QR gate; on the remote-start path this
    /// is the remotely issued one and `remote_start` is set.
    pub qr_token: String,
    pub remote_start: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayloadDto {
    pub photos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWithQrRequest {
    /// The session token obtained from the QR gate, passed through unchanged.
    pub qr_code: String,
    pub payload: CompletionPayloadDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPlanRequest {
    pub status: PlanStatusDto,
}
