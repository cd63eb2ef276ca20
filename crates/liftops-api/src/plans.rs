// Maintenance-plan endpoints.
//
// Thin wrappers over the pipeline -- lifecycle guards (transition table,
// conflict rule, photo minimum) run in `liftops-core` before any of these
// are called, and the backend re-validates everything.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    CancelPlanRequest, CompleteWithQrRequest, CreatePlanRequest, PlanDto, PlanStatusDto,
    ReschedulePlanRequest, StartExecutionRequest,
};

impl ApiClient {
    /// Fetch all maintenance plans (cancelled ones included -- they stay
    /// queryable, the calendar just skips them).
    pub async fn list_plans(&self) -> Result<Vec<PlanDto>, Error> {
        self.get("maintenance-plans").await
    }

    /// Create a plan for one elevator on one date.
    pub async fn create_plan(&self, req: &CreatePlanRequest) -> Result<PlanDto, Error> {
        debug!(
            elevator_id = req.elevator_id,
            date = %req.planned_date,
            "creating maintenance plan"
        );
        self.post("maintenance-plans", req).await
    }

    /// Move a planned visit to a new date.
    pub async fn reschedule_plan(&self, id: i64, req: &ReschedulePlanRequest) -> Result<PlanDto, Error> {
        debug!(plan_id = id, date = %req.planned_date, "rescheduling plan");
        self.patch(&format!("maintenance-plans/{id}/reschedule"), req)
            .await
    }

    /// Begin execution of a planned visit (QR-gated or remote-started).
    pub async fn start_execution(&self, req: &StartExecutionRequest) -> Result<PlanDto, Error> {
        debug!(
            plan_id = req.maintenance_plan_id,
            remote = req.remote_start,
            "starting execution"
        );
        self.post("maintenance-executions/start", req).await
    }

    /// Complete an in-progress visit with the QR session token and the
    /// completion payload (photos, note).
    pub async fn complete_with_qr(
        &self,
        id: i64,
        req: &CompleteWithQrRequest,
    ) -> Result<PlanDto, Error> {
        debug!(plan_id = id, photos = req.payload.photos.len(), "completing plan");
        self.post(&format!("maintenance-plans/{id}/complete-with-qr"), req)
            .await
    }

    /// Cancel a planned visit. A status transition, not a delete -- the
    /// plan stays queryable.
    pub async fn cancel_plan(&self, id: i64) -> Result<(), Error> {
        debug!(plan_id = id, "cancelling plan");
        let req = CancelPlanRequest {
            status: PlanStatusDto::Cancelled,
        };
        self.patch_ok(&format!("maintenance-plans/{id}"), &req).await
    }
}
