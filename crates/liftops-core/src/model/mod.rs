pub mod ids;
pub mod plan;
pub mod qr;
pub mod report;
pub mod session;

pub use ids::{ElevatorId, PlanId, TemplateId};
pub use plan::{DEFAULT_MIN_PHOTOS, MaintenancePlan, PlanStatus};
pub use qr::{QrGrant, QrToken};
pub use report::{CompletionReport, PhotoRef};
pub use session::{Role, Session};
