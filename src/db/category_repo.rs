use drypos_core::validation;
use drypos_core::{Category, Product, RecordKind};

use super::{Filter, LocalStore};
use crate::error::PosError;

#[derive(Clone)]
pub struct CategoryRepository {
    store: LocalStore,
}

impl CategoryRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, category: &Category) -> Result<Category, PosError> {
        validation::require("name", &category.name)?;

        let stored = category.clone();
        self.store
            .transact(move |tx| Box::pin(async move { tx.insert(&stored).await }))
            .await?;

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category.clone())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Category>, PosError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_by_business(&self, business_id: &str) -> Result<Vec<Category>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("business_id", business_id))
            .await?)
    }

    pub async fn update(&self, category: &Category) -> Result<Category, PosError> {
        validation::require("name", &category.name)?;

        let mut category = category.clone();
        let id = category.id.clone();
        let updated = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    let Some(existing) = tx.get::<Category>(&category.id).await? else {
                        return Ok(None);
                    };
                    category.business_id = existing.business_id;
                    tx.upsert(&category).await?;
                    Ok(Some(category))
                })
            })
            .await?;

        updated.ok_or_else(|| PosError::not_found(RecordKind::Category, id))
    }

    /// Deletes the category. Its products are left in place.
    pub async fn delete(&self, id: &str) -> Result<bool, PosError> {
        let id = id.to_string();
        Ok(self
            .store
            .transact(move |tx| Box::pin(async move { tx.delete_by_key::<Category>(&id).await }))
            .await?)
    }

    /// Products pointing at this category.
    pub async fn products(&self, category_id: &str) -> Result<Vec<Product>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("category_id", category_id))
            .await?)
    }
}
