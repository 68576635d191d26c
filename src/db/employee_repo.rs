use chrono::Utc;
use drypos_core::{Employee, RecordKind};

use super::{Filter, LocalStore};
use crate::error::PosError;

const MASKED_PIN: &str = "****";

#[derive(Clone)]
pub struct EmployeeRepository {
    store: LocalStore,
}

impl EmployeeRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Validates and stores a new employee.
    ///
    /// Fails with [`PosError::DuplicateField`] when another employee of the
    /// same business already signs in with the PIN.
    pub async fn create(&self, employee: &Employee) -> Result<Employee, PosError> {
        let employee = employee.validated()?;
        self.ensure_pin_unique(&employee).await?;

        let stored = employee.clone();
        self.store
            .transact(move |tx| Box::pin(async move { tx.insert(&stored).await }))
            .await?;

        tracing::info!(employee_id = %employee.id, business_id = %employee.business_id, "Created employee");
        Ok(employee)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Employee>, PosError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_by_business(&self, business_id: &str) -> Result<Vec<Employee>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("business_id", business_id))
            .await?)
    }

    /// Replaces an employee. The stored business id and creation time are
    /// kept whatever the caller passes.
    pub async fn update(&self, employee: &Employee) -> Result<Employee, PosError> {
        let mut employee = employee.validated()?;

        let Some(existing) = self.store.get::<Employee>(&employee.id).await? else {
            return Err(PosError::not_found(RecordKind::Employee, employee.id));
        };
        employee.business_id = existing.business_id;
        self.ensure_pin_unique(&employee).await?;

        let id = employee.id.clone();
        let updated = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    let Some(existing) = tx.get::<Employee>(&employee.id).await? else {
                        return Ok(None);
                    };
                    employee.created_at = existing.created_at;
                    employee.updated_at = Utc::now();
                    tx.upsert(&employee).await?;
                    Ok(Some(employee))
                })
            })
            .await?;

        updated.ok_or_else(|| PosError::not_found(RecordKind::Employee, id))
    }

    pub async fn delete(&self, id: &str) -> Result<bool, PosError> {
        let id = id.to_string();
        Ok(self
            .store
            .transact(move |tx| Box::pin(async move { tx.delete_by_key::<Employee>(&id).await }))
            .await?)
    }

    /// True when no other employee of the business signs in with this PIN.
    pub async fn pin_available(
        &self,
        business_id: &str,
        pin: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, PosError> {
        let wanted = pin.trim();
        let employees = self.list_by_business(business_id).await?;
        Ok(!employees
            .iter()
            .filter(|e| Some(e.id.as_str()) != exclude_id)
            .any(|e| e.pin.as_deref() == Some(wanted)))
    }

    async fn ensure_pin_unique(&self, employee: &Employee) -> Result<(), PosError> {
        let Some(pin) = employee.pin.as_deref() else {
            return Ok(());
        };
        if !self
            .pin_available(&employee.business_id, pin, Some(employee.id.as_str()))
            .await?
        {
            return Err(PosError::DuplicateField {
                field: "pin",
                value: MASKED_PIN.to_string(),
            });
        }
        Ok(())
    }
}
