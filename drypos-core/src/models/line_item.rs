use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order_status::OrderStatus;
use super::record::{Record, RecordKind};
use super::starch::StarchLevel;

/// One physical unit (garment) within an order.
///
/// `id` is generated per unit and never equals the catalog `product_id`.
/// Catalog fields are snapshotted at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub business_id: String,
    pub customer_id: String,
    pub employee_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub additional_price: Decimal,
    pub starch: Option<StarchLevel>,
    #[serde(default)]
    pub press_only: bool,
    #[serde(default)]
    pub notes: Vec<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for LineItem {
    const KIND: RecordKind = RecordKind::LineItem;

    fn id(&self) -> &str {
        &self.id
    }
}
