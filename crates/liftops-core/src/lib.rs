// liftops-core: domain layer between liftops-api and the UI shell.
//
// The maintenance-plan lifecycle state machine, the scheduling conflict
// rule, the QR session gate, and the reactive plan cache. Everything
// network-shaped delegates to the pipeline in liftops-api.

pub mod auth;
pub mod conflict;
pub mod convert;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod qr_gate;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::AuthService;
pub use conflict::has_conflict;
pub use error::CoreError;
pub use lifecycle::{PlanEvent, PlanLifecycle, check_transition};
pub use qr_gate::QrSessionGate;
pub use store::PlanStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CompletionReport, DEFAULT_MIN_PHOTOS, ElevatorId, MaintenancePlan, PhotoRef, PlanId,
    PlanStatus, QrGrant, QrToken, Role, Session, TemplateId,
};

// The session-state channel comes from the pipeline; surface it here so
// consumers rarely need liftops-api directly.
pub use liftops_api::SessionState;
