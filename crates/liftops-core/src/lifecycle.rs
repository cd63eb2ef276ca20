// ── Maintenance-plan lifecycle ──
//
// The state machine governing a planned visit: creation, rescheduling,
// QR-gated start, QR-gated completion, cancellation. Guards run
// client-side before any network call -- a violated invariant never
// reaches the pipeline -- and the backend re-validates everything, so a
// server rejection is recoverable: surface it and refetch.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use liftops_api::ApiClient;
use liftops_api::models::{
    CompleteWithQrRequest, CompletionPayloadDto, CreatePlanRequest, ReschedulePlanRequest,
    StartExecutionRequest,
};

use crate::conflict;
use crate::error::CoreError;
use crate::model::{
    CompletionReport, ElevatorId, MaintenancePlan, PlanId, PlanStatus, QrGrant, TemplateId,
};
use crate::store::PlanStore;

/// Events a plan can receive. Everything outside the transition table is
/// rejected without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanEvent {
    Create,
    Reschedule,
    Start,
    Complete,
    Cancel,
}

impl fmt::Display for PlanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Create => "create",
            Self::Reschedule => "reschedule",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        };
        f.write_str(verb)
    }
}

/// The transition table. Total over (status, event): anything unlisted is
/// an [`CoreError::InvalidTransition`].
///
/// | from        | event                        | to          |
/// |-------------|------------------------------|-------------|
/// | Planned     | Reschedule / Start / Cancel  | (see guard) |
/// | InProgress  | Complete                     | Completed   |
///
/// `Create` never applies to an existing plan; Completed and Cancelled
/// are terminal. There is deliberately no cancel path out of InProgress.
pub fn check_transition(from: PlanStatus, event: PlanEvent) -> Result<(), CoreError> {
    match (from, event) {
        (PlanStatus::Planned, PlanEvent::Reschedule | PlanEvent::Start | PlanEvent::Cancel)
        | (PlanStatus::InProgress, PlanEvent::Complete) => Ok(()),
        (from, event) => Err(CoreError::InvalidTransition { from, event }),
    }
}

/// Lifecycle service: guards, pipeline calls, cache resynchronization.
///
/// After every accepted mutation the plan collection is re-fetched whole;
/// the client always wins back to backend-sourced truth rather than
/// merging local edits.
pub struct PlanLifecycle {
    api: Arc<ApiClient>,
    store: Arc<PlanStore>,
}

impl PlanLifecycle {
    pub fn new(api: Arc<ApiClient>, store: Arc<PlanStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<PlanStore> {
        &self.store
    }

    /// Re-fetch all plans and replace the cache.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let dtos = self.api.list_plans().await?;
        self.store
            .replace_all(dtos.into_iter().map(MaintenancePlan::from).collect());
        debug!(plans = self.store.len(), "plan cache refreshed");
        Ok(())
    }

    /// Create a plan: one per elevator per calendar month.
    pub async fn create(
        &self,
        elevator_id: ElevatorId,
        template_id: TemplateId,
        date: NaiveDate,
    ) -> Result<MaintenancePlan, CoreError> {
        let snapshot = self.store.snapshot();
        if conflict::has_conflict(elevator_id, date, &snapshot, None) {
            return Err(CoreError::ScheduleConflict {
                elevator_id,
                month: month_label(date),
            });
        }

        // Tentative entry so the calendar blocks the slot while the
        // request is in flight; reconciled below either way.
        let entry = self
            .store
            .begin_pending(MaintenancePlan::tentative(elevator_id, template_id, date));

        let req = CreatePlanRequest {
            elevator_id: elevator_id.0,
            template_id: template_id.0,
            planned_date: date,
        };
        match self.api.create_plan(&req).await {
            Ok(dto) => {
                let plan = MaintenancePlan::from(dto);
                self.store.confirm(entry, plan.clone());
                self.refresh().await?;
                Ok(plan)
            }
            Err(e) => {
                self.store.rollback(entry);
                self.resync_after_rejection().await;
                Err(e.into())
            }
        }
    }

    /// Move a planned visit to a new date in a free slot.
    pub async fn reschedule(
        &self,
        id: PlanId,
        new_date: NaiveDate,
    ) -> Result<MaintenancePlan, CoreError> {
        let plan = self.store.get(id).ok_or(CoreError::PlanNotFound { id })?;
        check_transition(plan.status, PlanEvent::Reschedule)?;

        if new_date < Utc::now().date_naive() {
            return Err(CoreError::PastDate { date: new_date });
        }
        if conflict::has_conflict(plan.elevator_id, new_date, &self.store.snapshot(), Some(id)) {
            return Err(CoreError::ScheduleConflict {
                elevator_id: plan.elevator_id,
                month: month_label(new_date),
            });
        }

        let req = ReschedulePlanRequest {
            planned_date: new_date,
        };
        match self.api.reschedule_plan(id.0, &req).await {
            Ok(dto) => {
                self.refresh().await?;
                Ok(MaintenancePlan::from(dto))
            }
            Err(e) => {
                self.resync_after_rejection().await;
                Err(e.into())
            }
        }
    }

    /// Begin execution. The grant must be bound to the plan's elevator --
    /// a valid code for a different elevator is an authorization failure,
    /// not a validation one.
    pub async fn start(
        &self,
        id: PlanId,
        grant: &QrGrant,
        remote: bool,
    ) -> Result<MaintenancePlan, CoreError> {
        let plan = self.store.get(id).ok_or(CoreError::PlanNotFound { id })?;
        check_transition(plan.status, PlanEvent::Start)?;
        check_grant_binding(grant, &plan)?;

        let req = StartExecutionRequest {
            maintenance_plan_id: id.0,
            qr_token: grant.token.0.clone(),
            remote_start: remote,
        };
        match self.api.start_execution(&req).await {
            Ok(dto) => {
                self.refresh().await?;
                Ok(MaintenancePlan::from(dto))
            }
            Err(e) => {
                self.resync_after_rejection().await;
                Err(e.into())
            }
        }
    }

    /// Complete an in-progress visit with the QR grant and the report.
    /// The photo minimum is checked before the network call.
    pub async fn complete(
        &self,
        id: PlanId,
        grant: &QrGrant,
        report: &CompletionReport,
    ) -> Result<MaintenancePlan, CoreError> {
        let plan = self.store.get(id).ok_or(CoreError::PlanNotFound { id })?;
        check_transition(plan.status, PlanEvent::Complete)?;
        check_grant_binding(grant, &plan)?;

        if report.photo_count() < plan.min_photos {
            return Err(CoreError::InsufficientPhotos {
                required: plan.min_photos,
                got: report.photo_count(),
            });
        }

        let req = CompleteWithQrRequest {
            qr_code: grant.token.0.clone(),
            payload: CompletionPayloadDto {
                photos: report.photos.iter().map(|p| p.0.clone()).collect(),
                note: report.note.clone(),
            },
        };
        match self.api.complete_with_qr(id.0, &req).await {
            Ok(dto) => {
                self.refresh().await?;
                Ok(MaintenancePlan::from(dto))
            }
            Err(e) => {
                self.resync_after_rejection().await;
                Err(e.into())
            }
        }
    }

    /// Cancel a planned visit. A status transition -- the plan stays
    /// queryable and frees its month slot.
    pub async fn cancel(&self, id: PlanId) -> Result<(), CoreError> {
        let plan = self.store.get(id).ok_or(CoreError::PlanNotFound { id })?;
        check_transition(plan.status, PlanEvent::Cancel)?;

        match self.api.cancel_plan(id.0).await {
            Ok(()) => self.refresh().await,
            Err(e) => {
                self.resync_after_rejection().await;
                Err(e.into())
            }
        }
    }

    /// After a server-side rejection another client may have changed the
    /// schedule out from under us; win back to backend truth. Best-effort:
    /// the original rejection is what surfaces, not a refetch failure.
    async fn resync_after_rejection(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "plan resync after rejection failed");
        }
    }
}

fn check_grant_binding(grant: &QrGrant, plan: &MaintenancePlan) -> Result<(), CoreError> {
    if grant.elevator_id == plan.elevator_id {
        Ok(())
    } else {
        Err(CoreError::ElevatorMismatch {
            expected: plan.elevator_id,
            got: grant.elevator_id,
        })
    }
}

fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
