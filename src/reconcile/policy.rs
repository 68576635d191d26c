//! Duplicate-business policy.
//!
//! Each owner keeps exactly one authoritative business. When the remote
//! service returns several candidates, the one with the latest `updated_at`
//! wins and ties go to the smallest id. Every other local business for the
//! owner is evicted.

use drypos_core::Business;

use crate::db::{Filter, StoreError, Tx};

/// Picks the authoritative record out of `candidates`.
pub fn select_authoritative(candidates: &[Business]) -> Option<&Business> {
    candidates.iter().max_by(|a, b| {
        a.updated_at
            .cmp(&b.updated_at)
            .then_with(|| b.id.cmp(&a.id))
    })
}

/// Ids of local businesses that must be removed so only `keep_id` remains.
pub fn ids_to_evict<'a>(local: &'a [Business], keep_id: &str) -> Vec<&'a str> {
    local
        .iter()
        .filter(|b| b.id != keep_id)
        .map(|b| b.id.as_str())
        .collect()
}

/// Deletes every business of `owner_id` except `keep_id` inside `tx`.
/// Returns how many were evicted.
pub async fn retain_sole_authoritative(
    tx: &mut Tx,
    owner_id: &str,
    keep_id: &str,
) -> Result<usize, StoreError> {
    let local: Vec<Business> = tx.query(&Filter::all().eq("owner_id", owner_id)).await?;
    let evict = ids_to_evict(&local, keep_id);

    for id in &evict {
        tx.delete_by_key::<Business>(id).await?;
    }
    if !evict.is_empty() {
        tracing::info!(owner_id, kept = keep_id, evicted = evict.len(), "Evicted duplicate businesses");
    }
    Ok(evict.len())
}
