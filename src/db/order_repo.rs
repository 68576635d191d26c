use chrono::{DateTime, Utc};
use drypos_core::{Customer, Employee, LineItem, Order, OrderStatus};
use std::collections::HashMap;

use super::{Filter, LocalStore, StoreError, Tx};
use crate::error::PosError;

/// An order with the display names of its customer and employee. A name is
/// `None` when the referenced record is gone.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order: Order,
    pub customer_name: Option<String>,
    pub employee_name: Option<String>,
}

/// Reads and single-record edits of orders.
///
/// Orders are created together with their line items by
/// [`CheckoutBuilder`](crate::checkout::CheckoutBuilder). Every mutation
/// here returns `None` (or `false`) when the order does not exist.
#[derive(Clone)]
pub struct OrderRepository {
    store: LocalStore,
}

impl OrderRepository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Order>, PosError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_by_business(&self, business_id: &str) -> Result<Vec<Order>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("business_id", business_id))
            .await?)
    }

    pub async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("customer_id", customer_id))
            .await?)
    }

    pub async fn summary(&self, id: &str) -> Result<Option<OrderSummary>, PosError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };
        let customer = self.store.get::<Customer>(&order.customer_id).await?;
        let employee = self.store.get::<Employee>(&order.employee_id).await?;
        Ok(Some(OrderSummary {
            customer_name: customer.map(|c| c.details.full_name()),
            employee_name: employee.map(|e| e.full_name()),
            order,
        }))
    }

    /// Every order of the business with names attached, loading the
    /// business's customers and employees once.
    pub async fn summaries_by_business(
        &self,
        business_id: &str,
    ) -> Result<Vec<OrderSummary>, PosError> {
        let by_business = Filter::all().eq("business_id", business_id);
        let orders: Vec<Order> = self.store.query(&by_business).await?;
        let customers: HashMap<String, String> = self
            .store
            .query::<Customer>(&by_business)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c.details.full_name()))
            .collect();
        let employees: HashMap<String, String> = self
            .store
            .query::<Employee>(&by_business)
            .await?
            .into_iter()
            .map(|e| (e.id.clone(), e.full_name()))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderSummary {
                customer_name: customers.get(&order.customer_id).cloned(),
                employee_name: employees.get(&order.employee_id).cloned(),
                order,
            })
            .collect())
    }

    /// Line items of an order in creation order.
    pub async fn line_items(&self, order_id: &str) -> Result<Vec<LineItem>, PosError> {
        Ok(self
            .store
            .query(&Filter::all().eq("order_id", order_id))
            .await?)
    }

    /// Sets the status, appending `note` to the audit log in the same write.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<Option<Order>, PosError> {
        let note = note.map(str::to_string).filter(|n| !n.trim().is_empty());
        let updated = self
            .modify(id, move |order| {
                order.status = status;
                if let Some(note) = note {
                    order.append_note(note);
                }
            })
            .await?;

        if let Some(order) = &updated {
            tracing::info!(order_id = %order.id, status = %order.status, "Updated order status");
        }
        Ok(updated)
    }

    pub async fn add_note(&self, id: &str, note: &str) -> Result<Option<Order>, PosError> {
        let note = note.to_string();
        self.modify(id, move |order| order.append_note(note)).await
    }

    pub async fn update_pickup_date(
        &self,
        id: &str,
        pickup_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, PosError> {
        self.modify(id, move |order| order.pickup_date = pickup_date)
            .await
    }

    /// Deletes an order and its line items together. Returns whether the
    /// order existed.
    pub async fn delete(&self, id: &str) -> Result<bool, PosError> {
        let id = id.to_string();
        let deleted = self
            .store
            .transact(move |tx| {
                Box::pin(async move {
                    if tx.get::<Order>(&id).await?.is_none() {
                        return Ok(false);
                    }
                    let items = tx
                        .delete_where::<LineItem>(&Filter::all().eq("order_id", &id))
                        .await?;
                    tracing::debug!(order_id = %id, items, "Deleting order");
                    tx.delete_by_key::<Order>(&id).await
                })
            })
            .await?;
        Ok(deleted)
    }

    async fn modify<F>(&self, id: &str, edit: F) -> Result<Option<Order>, PosError>
    where
        F: FnOnce(&mut Order) + Send + 'static,
    {
        let id = id.to_string();
        Ok(self
            .store
            .transact(move |tx| Box::pin(modify_in(tx, id, edit)))
            .await?)
    }
}

async fn modify_in<F>(tx: &mut Tx, id: String, edit: F) -> Result<Option<Order>, StoreError>
where
    F: FnOnce(&mut Order),
{
    let Some(mut order) = tx.get::<Order>(&id).await? else {
        return Ok(None);
    };
    edit(&mut order);
    order.updated_at = Utc::now();
    tx.upsert(&order).await?;
    Ok(Some(order))
}
