use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Record, RecordKind};
use crate::validation::{self, ValidationError};

/// Editable display and contact fields of a business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub business_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub hours: Vec<String>,
    pub logo_url: Option<String>,
    pub logo_source: Option<String>,
}

impl BusinessDetails {
    pub fn new(business_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn with_owner_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    /// Checks required fields and contact formats.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("business_name", &self.business_name)?;
        validation::validate_phone(&self.phone)?;
        validation::validate_email(self.email.as_deref())?;
        Ok(())
    }
}

/// The business owned by one account. Reconciled against the remote service
/// by owner id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub owner_id: String,
    #[serde(flatten)]
    pub details: BusinessDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>, details: BusinessDetails) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }
}

impl Record for Business {
    const KIND: RecordKind = RecordKind::Business;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Business {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.details.business_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_validate() {
        let details = BusinessDetails::new("Press & Fold", "(555) 123-4567");
        assert!(details.validate().is_ok());

        let missing_name = BusinessDetails::new("  ", "5551234567");
        assert_eq!(
            missing_name.validate(),
            Err(ValidationError::Required("business_name"))
        );

        let short_phone = BusinessDetails::new("Press & Fold", "555-1234");
        assert!(matches!(
            short_phone.validate(),
            Err(ValidationError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_details_are_flattened_in_json() {
        let business = Business::new(
            "b1",
            "owner-1",
            BusinessDetails::new("Press & Fold", "5551234567").with_email("hi@press.test"),
        );
        let value = serde_json::to_value(&business).unwrap();
        assert_eq!(value["owner_id"], "owner-1");
        assert_eq!(value["business_name"], "Press & Fold");
        assert_eq!(value["email"], "hi@press.test");

        let parsed: Business = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, business);
    }
}
