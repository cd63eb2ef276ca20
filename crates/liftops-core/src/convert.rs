// Wire-to-domain conversions.
//
// `liftops-api` speaks the JSON contract; everything above it uses the
// domain types. Conversions are total -- optional wire fields get the
// documented client-side defaults.

use liftops_api::RoleClaim;
use liftops_api::models::{PlanDto, PlanStatusDto};

use crate::model::{
    DEFAULT_MIN_PHOTOS, ElevatorId, MaintenancePlan, PlanId, PlanStatus, Role, TemplateId,
};

impl From<PlanStatusDto> for PlanStatus {
    fn from(dto: PlanStatusDto) -> Self {
        match dto {
            PlanStatusDto::NotPlanned => Self::NotPlanned,
            PlanStatusDto::Planned => Self::Planned,
            PlanStatusDto::InProgress => Self::InProgress,
            PlanStatusDto::Completed => Self::Completed,
            PlanStatusDto::Cancelled => Self::Cancelled,
        }
    }
}

impl From<PlanDto> for MaintenancePlan {
    fn from(dto: PlanDto) -> Self {
        Self {
            id: PlanId(dto.id),
            elevator_id: ElevatorId(dto.elevator_id),
            template_id: TemplateId(dto.template_id),
            scheduled_date: dto.planned_date,
            status: dto.status.into(),
            note: dto.note,
            completed_date: dto.completed_date,
            min_photos: dto.min_photos.unwrap_or(DEFAULT_MIN_PHOTOS),
            pending: false,
        }
    }
}

impl From<RoleClaim> for Role {
    fn from(claim: RoleClaim) -> Self {
        match claim {
            RoleClaim::Patron => Self::Patron,
            RoleClaim::Personel => Self::Personel,
        }
    }
}
