// ── Reactive maintenance-plan cache ──
//
// Snapshot storage with push-based change notification via a `watch`
// channel. The backend is the source of truth: after every accepted
// mutation the whole collection is replaced from a refetch. Local writes
// exist only as explicitly reconciled pending entries -- a tentative
// entry is tagged, then either replaced by the server-confirmed entity or
// rolled back to the prior snapshot. Nothing mutates shared state in
// place.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::conflict;
use crate::model::{ElevatorId, MaintenancePlan, PlanId};

type Snapshot = Arc<Vec<Arc<MaintenancePlan>>>;

/// Handle for an in-flight tentative entry. Must be settled with
/// [`PlanStore::confirm`] or [`PlanStore::rollback`].
#[must_use = "pending entries must be confirmed or rolled back"]
pub struct PendingEntry {
    prior: Snapshot,
}

/// Reactive cache of all maintenance plans (cancelled ones included --
/// the calendar filters, the cache does not).
pub struct PlanStore {
    snapshot: watch::Sender<Snapshot>,
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { snapshot }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    pub fn get(&self, id: PlanId) -> Option<Arc<MaintenancePlan>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Replace the whole collection from a backend refetch.
    pub fn replace_all(&self, plans: Vec<MaintenancePlan>) {
        let snapshot: Vec<Arc<MaintenancePlan>> = plans.into_iter().map(Arc::new).collect();
        self.snapshot.send_modify(|snap| *snap = Arc::new(snapshot));
    }

    /// Delegates to the scheduling conflict rule over the current
    /// snapshot. Calendar rendering calls this to grey out dates; the
    /// lifecycle guards go through the same function.
    pub fn date_blocked(
        &self,
        elevator_id: ElevatorId,
        candidate: NaiveDate,
        exclude: Option<PlanId>,
    ) -> bool {
        conflict::has_conflict(elevator_id, candidate, &self.snapshot(), exclude)
    }

    // ── Pending-entry reconciliation ─────────────────────────────────

    /// Apply a tentative local entry (tagged pending) and capture the
    /// prior snapshot for rollback.
    pub fn begin_pending(&self, mut tentative: MaintenancePlan) -> PendingEntry {
        tentative.pending = true;
        let prior = self.snapshot();

        let mut next: Vec<Arc<MaintenancePlan>> = prior.as_ref().clone();
        next.push(Arc::new(tentative));
        self.snapshot.send_modify(|snap| *snap = Arc::new(next));

        PendingEntry { prior }
    }

    /// Replace the tentative entry with the server-confirmed entity.
    pub fn confirm(&self, entry: PendingEntry, mut confirmed: MaintenancePlan) {
        confirmed.pending = false;
        let mut next: Vec<Arc<MaintenancePlan>> = entry.prior.as_ref().clone();
        next.push(Arc::new(confirmed));
        self.snapshot.send_modify(|snap| *snap = Arc::new(next));
    }

    /// Restore the snapshot taken before the tentative entry was applied.
    pub fn rollback(&self, entry: PendingEntry) {
        self.snapshot.send_modify(|snap| *snap = entry.prior);
    }
}
