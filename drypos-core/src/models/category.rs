use serde::{Deserialize, Serialize};

use super::record::{Record, RecordKind};

/// A catalog grouping of products. Products point back to their category
/// through `Product::category_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        business_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            business_id: business_id.into(),
            name: name.into(),
            description: None,
            color: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl Record for Category {
    const KIND: RecordKind = RecordKind::Category;

    fn id(&self) -> &str {
        &self.id
    }
}
