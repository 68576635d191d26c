use chrono::Utc;
use drypos_core::{Product, RecordKind};

use super::{Filter, LocalStore};
use crate::error::PosError;

#[derive(Clone)]
pub struct ProductRepository {
    store: LocalStore,
}

impl ProductRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, product: &Product) -> Result<Product, PosError> {
        product.validate()?;

        let stored = product.clone();
        self.store
            .transact(move |tx| Box::pin(async move { tx.insert(&stored).await }))
            .await?;

        tracing::info!(product_id = %product.id, price = %product.price, "Created product");
        Ok(product.clone())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Product>, PosError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_by_business(&self, business_id: &str) -> Result<Vec<Product>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("business_id", business_id))
            .await?)
    }

    pub async fn list_by_category(&self, category_id: &str) -> Result<Vec<Product>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("category_id", category_id))
            .await?)
    }

    /// Case-insensitive substring match on the product name.
    pub async fn search(&self, business_id: &str, term: &str) -> Result<Vec<Product>, PosError> {
        Ok(self
            .store
            .query(
                &Filter::all()
                    .eq("business_id", business_id)
                    .contains("name", term.trim()),
            )
            .await?)
    }

    pub async fn update(&self, product: &Product) -> Result<Product, PosError> {
        product.validate()?;

        let mut product = product.clone();
        let id = product.id.clone();
        let updated = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    let Some(existing) = tx.get::<Product>(&product.id).await? else {
                        return Ok(None);
                    };
                    product.business_id = existing.business_id;
                    product.created_at = existing.created_at;
                    product.updated_at = Utc::now();
                    tx.upsert(&product).await?;
                    Ok(Some(product))
                })
            })
            .await?;

        updated.ok_or_else(|| PosError::not_found(RecordKind::Product, id))
    }

    pub async fn delete(&self, id: &str) -> Result<bool, PosError> {
        let id = id.to_string();
        Ok(self
            .store
            .transact(move |tx| Box::pin(async move { tx.delete_by_key::<Product>(&id).await }))
            .await?)
    }
}
