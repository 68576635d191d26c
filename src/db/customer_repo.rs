use chrono::Utc;
use drypos_core::validation::{normalize_email, normalize_phone};
use drypos_core::{Customer, RecordKind};

use super::{Filter, LocalStore};
use crate::error::PosError;

const SEARCH_FIELDS: &[&str] = &["first_name", "last_name", "phone", "email"];

#[derive(Clone)]
pub struct CustomerRepository {
    store: LocalStore,
}

impl CustomerRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Validates and stores a new customer.
    ///
    /// Fails with [`PosError::DuplicateField`] when another customer of the
    /// same business already has the phone number or email.
    pub async fn create(&self, customer: &Customer) -> Result<Customer, PosError> {
        let mut customer = customer.clone();
        customer.details = customer.details.validated()?;
        self.ensure_unique(&customer).await?;

        let stored = customer.clone();
        self.store
            .transact(move |tx| Box::pin(async move { tx.insert(&stored).await }))
            .await?;

        tracing::info!(customer_id = %customer.id, business_id = %customer.business_id, "Created customer");
        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Customer>, PosError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_by_business(&self, business_id: &str) -> Result<Vec<Customer>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("business_id", business_id))
            .await?)
    }

    /// Case-insensitive substring match over name, phone and email.
    pub async fn search(&self, business_id: &str, term: &str) -> Result<Vec<Customer>, PosError> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_by_business(business_id).await;
        }
        Ok(self
            .store
            .query(
                &Filter::all()
                    .eq("business_id", business_id)
                    .any_contains(SEARCH_FIELDS, term),
            )
            .await?)
    }

    /// Replaces a customer's details. The stored business id and creation
    /// time are kept whatever the caller passes.
    pub async fn update(&self, customer: &Customer) -> Result<Customer, PosError> {
        let mut customer = customer.clone();
        customer.details = customer.details.validated()?;

        let Some(existing) = self.store.get::<Customer>(&customer.id).await? else {
            return Err(PosError::not_found(RecordKind::Customer, customer.id));
        };
        customer.business_id = existing.business_id;
        self.ensure_unique(&customer).await?;

        let id = customer.id.clone();
        let updated = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    let Some(existing) = tx.get::<Customer>(&customer.id).await? else {
                        return Ok(None);
                    };
                    customer.business_id = existing.business_id;
                    customer.created_at = existing.created_at;
                    customer.updated_at = Utc::now();
                    tx.upsert(&customer).await?;
                    Ok(Some(customer))
                })
            })
            .await?;

        updated.ok_or_else(|| PosError::not_found(RecordKind::Customer, id))
    }

    /// Hard-deletes a customer. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> Result<bool, PosError> {
        let id = id.to_string();
        let deleted = self
            .store
            .transact(move |tx| Box::pin(async move { tx.delete_by_key::<Customer>(&id).await }))
            .await?;
        Ok(deleted)
    }

    /// Appends to the customer's note list. Returns `None` for an unknown id.
    pub async fn add_note(&self, id: &str, note: &str) -> Result<Option<Customer>, PosError> {
        let id = id.to_string();
        let note = note.to_string();
        let updated = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    let Some(mut customer) = tx.get::<Customer>(&id).await? else {
                        return Ok(None);
                    };
                    customer.notes.push(note);
                    customer.updated_at = Utc::now();
                    tx.upsert(&customer).await?;
                    Ok(Some(customer))
                })
            })
            .await?;
        Ok(updated)
    }

    /// True when no other customer of the business uses this phone number.
    /// Numbers compare by their digits only.
    pub async fn phone_available(
        &self,
        business_id: &str,
        phone: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, PosError> {
        let wanted = normalize_phone(phone);
        let customers = self.list_by_business(business_id).await?;
        Ok(!customers
            .iter()
            .filter(|c| Some(c.id.as_str()) != exclude_id)
            .any(|c| normalize_phone(&c.details.phone) == wanted))
    }

    /// True when no other customer of the business uses this email,
    /// ignoring case.
    pub async fn email_available(
        &self,
        business_id: &str,
        email: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, PosError> {
        let wanted = normalize_email(email);
        let customers = self.list_by_business(business_id).await?;
        Ok(!customers
            .iter()
            .filter(|c| Some(c.id.as_str()) != exclude_id)
            .filter_map(|c| c.details.email.as_deref())
            .any(|email| normalize_email(email) == wanted))
    }

    async fn ensure_unique(&self, customer: &Customer) -> Result<(), PosError> {
        let business_id = &customer.business_id;
        let own_id = Some(customer.id.as_str());

        if !self
            .phone_available(business_id, &customer.details.phone, own_id)
            .await?
        {
            return Err(PosError::DuplicateField {
                field: "phone",
                value: customer.details.phone.clone(),
            });
        }

        if let Some(email) = customer.details.email.as_deref() {
            if !self.email_available(business_id, email, own_id).await? {
                return Err(PosError::DuplicateField {
                    field: "email",
                    value: email.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drypos_core::CustomerDetails;
    use tempfile::TempDir;

    struct TestContext {
        repo: CustomerRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        TestContext {
            repo: CustomerRepository::new(store),
            _temp_dir: temp_dir,
        }
    }

    fn customer(id: &str, business_id: &str, phone: &str) -> Customer {
        Customer::new(id, business_id, CustomerDetails::new("Ada", "Lovelace", phone))
    }

    fn customer_with_email(id: &str, business_id: &str, phone: &str, email: &str) -> Customer {
        Customer::new(
            id,
            business_id,
            CustomerDetails::new("Ada", "Lovelace", phone).with_email(email),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_customer() {
        let ctx = setup_repo().await;
        let new = customer_with_email("c1", "b1", "555-123-4567", "  ada@example.com ");

        let created = ctx.repo.create(&new).await.unwrap();
        assert_eq!(created.details.email.as_deref(), Some("ada@example.com"));

        let fetched = ctx.repo.get("c1").await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_formatted_phone_is_a_duplicate() {
        let ctx = setup_repo().await;
        ctx.repo
            .create(&customer("c1", "b1", "555-123-4567"))
            .await
            .unwrap();

        let result = ctx.repo.create(&customer("c2", "b1", "5551234567")).await;
        assert!(matches!(
            result,
            Err(PosError::DuplicateField { field: "phone", .. })
        ));
        assert!(!ctx
            .repo
            .phone_available("b1", "(555) 123 4567", None)
            .await
            .unwrap());

        // Other businesses are unaffected
        assert!(ctx.repo.create(&customer("c3", "b2", "5551234567")).await.is_ok());
    }

    #[tokio::test]
    async fn test_email_uniqueness_ignores_case() {
        let ctx = setup_repo().await;
        let first = customer_with_email("c1", "b1", "5551234567", "ada@example.com");
        ctx.repo.create(&first).await.unwrap();

        let second = customer_with_email("c2", "b1", "5559876543", "ADA@Example.com");
        let result = ctx.repo.create(&second).await;
        assert!(matches!(
            result,
            Err(PosError::DuplicateField { field: "email", .. })
        ));
        assert!(ctx
            .repo
            .email_available("b1", "ada@example.com", Some("c1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let ctx = setup_repo().await;

        let result = ctx.repo.create(&customer("c1", "b1", "555-1234")).await;
        assert!(matches!(result, Err(PosError::Validation(_))));

        let bad_email = customer_with_email("c2", "b1", "5551234567", "not-an-email");
        let result = ctx.repo.create(&bad_email).await;
        assert!(matches!(result, Err(PosError::Validation(_))));

        assert!(ctx.repo.list_by_business("b1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_may_keep_own_phone() {
        let ctx = setup_repo().await;
        let created = ctx
            .repo
            .create(&customer("c1", "b1", "5551234567"))
            .await
            .unwrap();

        let mut edited = created.clone();
        edited.details.last_name = "King".into();
        let updated = ctx.repo.update(&edited).await.unwrap();
        assert_eq!(updated.details.last_name, "King");
        assert_eq!(updated.created_at, created.created_at);

        let missing = ctx.repo.update(&customer("nope", "b1", "5550000000")).await;
        assert!(matches!(missing, Err(PosError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_checks_uniqueness_in_stored_business() {
        let ctx = setup_repo().await;
        ctx.repo
            .create(&customer("c1", "b1", "5551234567"))
            .await
            .unwrap();
        ctx.repo
            .create(&customer("c2", "b1", "5559876543"))
            .await
            .unwrap();

        let mut moved = customer("c2", "b2", "555-123-4567");
        moved.details.first_name = "Grace".into();
        let result = ctx.repo.update(&moved).await;
        assert!(matches!(
            result,
            Err(PosError::DuplicateField { field: "phone", .. })
        ));

        let stored = ctx.repo.get("c2").await.unwrap().unwrap();
        assert_eq!(stored.business_id, "b1");
        assert_eq!(stored.details.phone, "5559876543");
    }

    #[tokio::test]
    async fn test_search() {
        let ctx = setup_repo().await;
        ctx.repo
            .create(&customer("c1", "b1", "5551234567"))
            .await
            .unwrap();
        let grace = Customer::new(
            "c2",
            "b1",
            CustomerDetails::new("Grace", "Hopper", "5559876543"),
        );
        ctx.repo.create(&grace).await.unwrap();

        let found = ctx.repo.search("b1", "hop").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "c2");

        let found = ctx.repo.search("b1", "555").await.unwrap();
        assert_eq!(found.len(), 2);

        assert_eq!(ctx.repo.search("b1", "  ").await.unwrap().len(), 2);
        assert!(ctx.repo.search("b2", "ada").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_note_and_delete() {
        let ctx = setup_repo().await;
        ctx.repo
            .create(&customer("c1", "b1", "5551234567"))
            .await
            .unwrap();

        ctx.repo.add_note("c1", "Prefers hangers").await.unwrap();
        let updated = ctx.repo.add_note("c1", "No starch").await.unwrap().unwrap();
        assert_eq!(updated.notes, vec!["Prefers hangers", "No starch"]);
        assert!(ctx.repo.add_note("nope", "x").await.unwrap().is_none());

        assert!(ctx.repo.delete("c1").await.unwrap());
        assert!(!ctx.repo.delete("c1").await.unwrap());
        assert!(ctx.repo.get("c1").await.unwrap().is_none());
    }
}
