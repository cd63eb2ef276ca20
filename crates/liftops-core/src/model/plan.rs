// Maintenance-plan domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ElevatorId, PlanId, TemplateId};

/// Completion-photo minimum applied when a plan carries none of its own.
pub const DEFAULT_MIN_PHOTOS: u32 = 4;

/// Lifecycle status of a planned maintenance visit.
///
/// `NotPlanned` only ever describes an empty calendar cell -- no persisted
/// plan is created in that status. Cancellation is a status transition,
/// never a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    NotPlanned,
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl PlanStatus {
    /// Active plans count against the one-per-elevator-per-month limit.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Planned | Self::InProgress | Self::Completed)
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A single planned maintenance visit for one elevator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenancePlan {
    pub id: PlanId,
    pub elevator_id: ElevatorId,
    pub template_id: TemplateId,
    pub scheduled_date: NaiveDate,
    pub status: PlanStatus,
    pub note: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
    /// Minimum completion photos for this plan.
    pub min_photos: u32,
    /// Local-only reconciliation tag: `true` while a create is in flight
    /// and the entry has not been confirmed by the backend.
    pub pending: bool,
}

impl MaintenancePlan {
    /// A tentative local entry for an in-flight create. Carries a
    /// placeholder id; replaced by the server-confirmed entity or rolled
    /// back, never kept.
    pub fn tentative(elevator_id: ElevatorId, template_id: TemplateId, date: NaiveDate) -> Self {
        Self {
            id: PlanId(0),
            elevator_id,
            template_id,
            scheduled_date: date,
            status: PlanStatus::Planned,
            note: None,
            completed_date: None,
            min_photos: DEFAULT_MIN_PHOTOS,
            pending: true,
        }
    }
}
