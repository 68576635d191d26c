use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::order_status::OrderStatus;
use super::record::{Record, RecordKind};

/// A customer order. Line items are separate records referenced by
/// `item_ids`; each of them also carries this order's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub business_id: String,
    pub customer_id: String,
    pub employee_id: String,
    pub item_ids: Vec<String>,
    pub payment_method: String,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub additional_price: Decimal,
    pub total: Decimal,
    /// Append-only audit log.
    #[serde(default)]
    pub notes: Vec<String>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn append_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

impl Record for Order {
    const KIND: RecordKind = RecordKind::Order;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Order {}", self.id)?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Items: {}", self.item_ids.len())?;
        writeln!(f, "Total: ${}", self.total.round_dp(2))?;
        if let Some(pickup) = self.pickup_date {
            writeln!(f, "Pickup: {}", pickup.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}
