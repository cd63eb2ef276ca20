// Scheduling conflict rule.
//
// The single source of truth for the one-active-plan-per-elevator-per-month
// invariant. Both the planning calendar (to grey out dates) and the
// lifecycle's create/reschedule guards call this -- duplicating the logic
// anywhere else is a correctness risk, since two copies drift.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::model::{ElevatorId, MaintenancePlan, PlanId};

/// Would scheduling a visit for `elevator_id` on `candidate` collide with
/// an existing active plan in the same calendar month?
///
/// Cancelled plans never count. `exclude` names a plan to ignore -- the
/// plan being rescheduled must not conflict with itself.
pub fn has_conflict(
    elevator_id: ElevatorId,
    candidate: NaiveDate,
    existing: &[Arc<MaintenancePlan>],
    exclude: Option<PlanId>,
) -> bool {
    existing.iter().any(|plan| {
        plan.status.is_active()
            && plan.elevator_id == elevator_id
            && exclude != Some(plan.id)
            && same_month(plan.scheduled_date, candidate)
    })
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
