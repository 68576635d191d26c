//! Order creation.
//!
//! A cart is expanded into one line item per physical unit, and the line
//! items and their order are written in a single store transaction.

use chrono::{DateTime, Utc};
use drypos_core::validation;
use drypos_core::{Employee, IdSource, LineItem, Order, OrderStatus, Product, StarchLevel};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::LocalStore;
use crate::error::PosError;

/// Options applied to every unit of a cart entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOptions {
    /// Free-form starch choice; anything other than `none`, `light`,
    /// `medium` or `heavy` is dropped.
    pub starch: Option<String>,
    pub press_only: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: u32,
    pub options: UnitOptions,
}

impl CartEntry {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            options: UnitOptions::default(),
        }
    }

    pub fn with_starch(mut self, starch: impl Into<String>) -> Self {
        self.options.starch = Some(starch.into());
        self
    }

    pub fn with_press_only(mut self, press_only: bool) -> Self {
        self.options.press_only = press_only;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.options.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub items: Vec<CartEntry>,
    pub business_id: String,
    pub customer_id: String,
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub payment_method: String,
    /// Computed by the caller; stored as given.
    pub total: Decimal,
    pub pickup_date: Option<DateTime<Utc>>,
}

/// The committed order and its line items.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub line_items: Vec<LineItem>,
}

impl CheckoutReceipt {
    /// Sum of the line items' net prices.
    pub fn item_total(&self) -> Decimal {
        self.line_items
            .iter()
            .map(|item| item.price - item.discount + item.additional_price)
            .sum()
    }
}

#[derive(Clone)]
pub struct CheckoutBuilder {
    store: LocalStore,
    ids: Arc<dyn IdSource>,
}

impl CheckoutBuilder {
    pub fn new(store: LocalStore, ids: Arc<dyn IdSource>) -> Self {
        Self { store, ids }
    }

    /// Creates the order and one line item per unit in one transaction.
    ///
    /// If any write fails nothing is kept. Never contacts the remote
    /// service.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, PosError> {
        validation::require("business_id", &request.business_id)?;
        validation::require("customer_id", &request.customer_id)?;
        validation::require("employee_id", &request.employee_id)?;
        validation::non_negative("total", request.total)?;

        let now = Utc::now();
        let order_id = self.ids.next_id();

        let line_items: Vec<LineItem> = request
            .items
            .iter()
            .flat_map(|entry| (0..entry.quantity).map(move |_| entry))
            .map(|entry| self.line_item(entry, &order_id, &request, now))
            .collect();

        let created_by = self.audit_name(&request).await?;

        let order = Order {
            id: order_id,
            business_id: request.business_id,
            customer_id: request.customer_id,
            employee_id: request.employee_id,
            item_ids: line_items.iter().map(|item| item.id.clone()).collect(),
            payment_method: request.payment_method,
            discount: Decimal::ZERO,
            additional_price: Decimal::ZERO,
            total: request.total,
            notes: vec![format!(
                "Order created by {} at {}",
                created_by,
                now.format("%Y-%m-%d %H:%M:%S")
            )],
            pickup_date: request.pickup_date,
            status: OrderStatus::Created,
            created_at: now,
            updated_at: now,
        };

        let receipt = CheckoutReceipt { order, line_items };
        let staged = receipt.clone();
        self.store
            .transact(move |tx| {
                Box::pin(async move {
                    for item in &staged.line_items {
                        tx.insert(item).await?;
                    }
                    tx.insert(&staged.order).await
                })
            })
            .await
            .map_err(|e| {
                tracing::error!(order_id = %receipt.order.id, "Checkout failed: {}", e);
                e
            })?;

        tracing::info!(
            order_id = %receipt.order.id,
            items = receipt.line_items.len(),
            total = %receipt.order.total,
            "Created order"
        );
        Ok(receipt)
    }

    /// Name written into the order's audit note: the given name, else the
    /// stored employee's full name, else the employee id.
    async fn audit_name(&self, request: &CheckoutRequest) -> Result<String, PosError> {
        let given = request
            .employee_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        if let Some(name) = given {
            return Ok(name.to_string());
        }

        let stored = self.store.get::<Employee>(&request.employee_id).await?;
        Ok(match stored {
            Some(employee) => employee.full_name(),
            None => format!("Employee ID: {}", request.employee_id),
        })
    }

    fn line_item(
        &self,
        entry: &CartEntry,
        order_id: &str,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> LineItem {
        let product = &entry.product;
        LineItem {
            id: self.ids.next_id(),
            order_id: order_id.to_string(),
            product_id: product.id.clone(),
            business_id: request.business_id.clone(),
            customer_id: request.customer_id.clone(),
            employee_id: request.employee_id.clone(),
            category_id: product.category_id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            discount: product.discount,
            additional_price: product.additional_price,
            starch: StarchLevel::coerce(entry.options.starch.as_deref()),
            press_only: entry.options.press_only,
            notes: entry
                .options
                .notes
                .iter()
                .filter(|n| !n.trim().is_empty())
                .cloned()
                .collect(),
            status: OrderStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }
}
