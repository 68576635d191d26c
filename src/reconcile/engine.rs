use drypos_core::{Business, BusinessDetails, RemoteError, RemoteSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::policy::{retain_sole_authoritative, select_authoritative};
use super::state::ReconcileState;
use crate::db::{BusinessRepository, LocalStore};
use crate::error::PosError;

/// Minimum spacing between unforced remote fetches.
pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(2);

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Keeps the local business for an owner in step with the remote service.
///
/// Reads degrade to local data when the remote fails; writes surface the
/// remote failure. Clones share the same [`ReconcileState`].
#[derive(Clone)]
pub struct BusinessReconciler {
    store: LocalStore,
    businesses: BusinessRepository,
    remote: Arc<dyn RemoteSource>,
    state: Arc<ReconcileState>,
    throttle: Duration,
    remote_timeout: Duration,
}

impl BusinessReconciler {
    pub fn new(store: LocalStore, remote: Arc<dyn RemoteSource>, state: Arc<ReconcileState>) -> Self {
        Self {
            businesses: BusinessRepository::new(store.clone()),
            store,
            remote,
            state,
            throttle: DEFAULT_THROTTLE,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    pub fn state(&self) -> &Arc<ReconcileState> {
        &self.state
    }

    /// Returns the authoritative business for `owner_id`, if any.
    ///
    /// While another reconciliation is running, or within the throttle
    /// window of the last one (unless `force_refresh`), this answers from
    /// the last known snapshot without contacting the remote. Remote
    /// failures are logged and the local copy is returned; only local store
    /// errors are raised.
    pub async fn resolve(
        &self,
        owner_id: &str,
        force_refresh: bool,
    ) -> Result<Option<Business>, PosError> {
        let Some(_guard) = self.state.try_begin() else {
            tracing::debug!(owner_id, "Reconciliation in flight, returning last known business");
            return self.last_known(owner_id).await;
        };

        if !force_refresh && self.state.fetched_within(self.throttle) {
            tracing::debug!(owner_id, "Reconciliation throttled");
            return self.last_known(owner_id).await;
        }

        let started_epoch = self.state.epoch(owner_id);
        let local = self.local_authoritative(owner_id).await?;

        if local.is_some() && !force_refresh {
            return Ok(self.finish(local));
        }

        let candidates = match timeout(self.remote_timeout, self.remote.list_by_owner(owner_id)).await {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                tracing::warn!(owner_id, "Failed to fetch businesses from remote: {}", e);
                return Ok(self.finish(local));
            }
            Err(_) => {
                tracing::warn!(owner_id, timeout = ?self.remote_timeout, "Timed out fetching businesses from remote");
                return Ok(self.finish(local));
            }
        };

        let candidates: Vec<Business> = candidates
            .into_iter()
            .filter(|b| b.owner_id == owner_id)
            .collect();
        let Some(canonical) = select_authoritative(&candidates).cloned() else {
            tracing::debug!(owner_id, "Remote has no business for owner");
            return Ok(self.finish(local));
        };
        if candidates.len() > 1 {
            tracing::warn!(
                owner_id,
                candidates = candidates.len(),
                chosen = %canonical.id,
                "Remote returned several businesses for one owner"
            );
        }

        let state = Arc::clone(&self.state);
        let owner = owner_id.to_string();
        let record = canonical.clone();
        let applied = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    if state.epoch(&owner) != started_epoch {
                        return Ok(false);
                    }
                    tx.upsert(&record).await?;
                    retain_sole_authoritative(tx, &owner, &record.id).await?;
                    Ok(true)
                })
            })
            .await?;

        if !applied {
            tracing::debug!(owner_id, "Local business changed during reconciliation, keeping local copy");
            let current = self.local_authoritative(owner_id).await?;
            return Ok(self.finish(current));
        }

        tracing::info!(owner_id, business_id = %canonical.id, "Reconciled business with remote");
        Ok(self.finish(Some(canonical)))
    }

    /// Creates the business for `owner_id`.
    ///
    /// Without `remote_id` the remote service creates the record first and
    /// its failure is returned as [`PosError::RemoteWrite`]. The new record
    /// then replaces every other local business of the owner.
    pub async fn create(
        &self,
        owner_id: &str,
        details: &BusinessDetails,
        remote_id: Option<String>,
    ) -> Result<Business, PosError> {
        details.validate()?;

        let mut business = match remote_id {
            Some(id) => Business::new(id, owner_id, details.clone()),
            None => {
                match timeout(self.remote_timeout, self.remote.create_business(owner_id, details))
                    .await
                {
                    Ok(Ok(created)) => created,
                    Ok(Err(e)) => {
                        tracing::error!(owner_id, "Remote business create failed: {}", e);
                        return Err(PosError::RemoteWrite(e));
                    }
                    Err(_) => {
                        tracing::error!(owner_id, "Remote business create timed out");
                        return Err(PosError::RemoteWrite(RemoteError::Unavailable(format!(
                            "timed out after {:?}",
                            self.remote_timeout
                        ))));
                    }
                }
            }
        };
        business.owner_id = owner_id.to_string();

        let state = Arc::clone(&self.state);
        let record = business.clone();
        let evicted = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    tx.upsert(&record).await?;
                    let evicted = retain_sole_authoritative(tx, &record.owner_id, &record.id).await?;
                    state.bump_epoch(&record.owner_id);
                    Ok(evicted)
                })
            })
            .await?;

        self.state.remember(&business);
        tracing::info!(owner_id, business_id = %business.id, evicted, "Created business");
        Ok(business)
    }

    /// Edits display fields of the owner's business.
    pub async fn update(&self, business: &Business) -> Result<Business, PosError> {
        let state = Arc::clone(&self.state);
        let updated = self
            .businesses
            .update_with(business, move |stored| {
                state.bump_epoch(&stored.owner_id);
            })
            .await?;
        self.state.remember(&updated);
        Ok(updated)
    }

    /// Snapshot for callers that must not trigger a fetch: the cached value
    /// if there is one, otherwise whatever the local store holds.
    async fn last_known(&self, owner_id: &str) -> Result<Option<Business>, PosError> {
        if let Some(business) = self.state.last_known(owner_id) {
            return Ok(Some(business));
        }
        self.local_authoritative(owner_id).await
    }

    async fn local_authoritative(&self, owner_id: &str) -> Result<Option<Business>, PosError> {
        let local = self.businesses.find_by_owner(owner_id).await?;
        Ok(select_authoritative(&local).cloned())
    }

    fn finish(&self, result: Option<Business>) -> Option<Business> {
        if let Some(business) = &result {
            self.state.remember(business);
        }
        self.state.mark_fetched();
        result
    }
}
