use chrono::Utc;
use drypos_core::{Business, RecordKind};

use super::{Filter, LocalStore};
use crate::error::PosError;

/// Local access to business records.
///
/// Businesses are created and de-duplicated by the reconciler; this
/// repository only reads them and edits display fields of an existing one.
#[derive(Clone)]
pub struct BusinessRepository {
    store: LocalStore,
}

impl BusinessRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Business>, PosError> {
        Ok(self.store.get(id).await?)
    }

    /// Every local business for `owner_id`, oldest first.
    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("owner_id", owner_id))
            .await?)
    }

    /// Replaces the display fields of an existing business.
    pub async fn update(&self, business: &Business) -> Result<Business, PosError> {
        self.update_with(business, |_| {}).await
    }

    /// Like [`update`](Self::update), calling `on_write` inside the write
    /// transaction once the record has been stored. Nothing is called when
    /// validation fails or the business does not exist.
    pub async fn update_with<F>(&self, business: &Business, on_write: F) -> Result<Business, PosError>
    where
        F: FnOnce(&Business) + Send + 'static,
    {
        business.details.validate()?;

        let mut business = business.clone();
        let id = business.id.clone();
        let updated = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    let Some(existing) = tx.get::<Business>(&business.id).await? else {
                        return Ok(None);
                    };
                    business.owner_id = existing.owner_id;
                    business.created_at = existing.created_at;
                    business.updated_at = Utc::now();
                    tx.upsert(&business).await?;
                    on_write(&business);
                    Ok(Some(business))
                })
            })
            .await?;

        let business = updated.ok_or_else(|| PosError::not_found(RecordKind::Business, id))?;
        tracing::info!(business_id = %business.id, "Updated business");
        Ok(business)
    }
}
