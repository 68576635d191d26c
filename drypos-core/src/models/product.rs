use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Record, RecordKind};
use super::starch::StarchLevel;
use crate::validation::{self, ValidationError};

/// A catalog product (a garment service with a price).
///
/// `starch`, `press_only` and `notes` are normally empty on catalog entries;
/// they are carried so a cart can hold per-unit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub business_id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub additional_price: Decimal,
    pub image_name: Option<String>,
    pub image_url: Option<String>,
    pub starch: Option<StarchLevel>,
    #[serde(default)]
    pub press_only: bool,
    #[serde(default)]
    pub notes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        business_id: impl Into<String>,
        category_id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            business_id: business_id.into(),
            category_id: category_id.into(),
            name: name.into(),
            description: None,
            price,
            discount: Decimal::ZERO,
            additional_price: Decimal::ZERO,
            image_name: None,
            image_url: None,
            starch: None,
            press_only: false,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("name", &self.name)?;
        validation::require("category_id", &self.category_id)?;
        validation::non_negative("price", self.price)?;
        validation::non_negative("discount", self.discount)?;
        validation::non_negative("additional_price", self.additional_price)?;
        Ok(())
    }
}

impl Record for Product {
    const KIND: RecordKind = RecordKind::Product;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - ${}", self.name, self.price.round_dp(2))
    }
}
