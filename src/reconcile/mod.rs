//! Business reconciliation.
//!
//! Keeps exactly one authoritative business per owner in the local store,
//! fetching from the remote service when asked to and de-duplicating
//! concurrent and rapid-fire requests.

mod engine;
mod policy;
mod state;

pub use engine::{BusinessReconciler, DEFAULT_REMOTE_TIMEOUT, DEFAULT_THROTTLE};
pub use policy::{ids_to_evict, retain_sole_authoritative, select_authoritative};
pub use state::{InFlightGuard, ReconcileState};
