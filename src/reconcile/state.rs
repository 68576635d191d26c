use drypos_core::Business;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Process-wide reconciliation state.
///
/// One instance is built at startup and shared by every
/// [`BusinessReconciler`](super::BusinessReconciler) clone; tests build
/// their own.
#[derive(Debug, Default)]
pub struct ReconcileState {
    in_flight: AtomicBool,
    last_fetch: Mutex<Option<Instant>>,
    last_known: Mutex<HashMap<String, Business>>,
    epochs: Mutex<HashMap<String, u64>>,
}

/// Clears the in-flight flag when dropped, including when the owning
/// future is cancelled.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ReconcileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the in-flight flag, or returns `None` if a reconciliation is
    /// already running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: &self.in_flight,
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// True when the last completed fetch finished less than `window` ago.
    pub fn fetched_within(&self, window: Duration) -> bool {
        self.last_fetch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|at| at.elapsed() < window)
    }

    pub fn mark_fetched(&self) {
        *self.last_fetch.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Last snapshot handed out for `owner_id`.
    pub fn last_known(&self, owner_id: &str) -> Option<Business> {
        self.last_known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner_id)
            .cloned()
    }

    pub fn remember(&self, business: &Business) {
        self.last_known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(business.owner_id.clone(), business.clone());
    }

    /// Per-owner counter bumped by every local business write for that
    /// owner. A reconciliation that observes a different value than it
    /// started with holds stale data.
    pub fn epoch(&self, owner_id: &str) -> u64 {
        self.epochs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(owner_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn bump_epoch(&self, owner_id: &str) -> u64 {
        let mut epochs = self.epochs.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = epochs.entry(owner_id.to_string()).or_insert(0);
        *epoch += 1;
        *epoch
    }
}
