use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Record, RecordKind};
use crate::validation::{self, ValidationError};

/// Editable customer fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub dob: Option<NaiveDate>,
}

impl CustomerDetails {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(
        mut self,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.city = Some(city.into());
        self.state = Some(state.into());
        self.zip_code = Some(zip_code.into());
        self
    }

    /// Validates required fields and formats, returning a copy with the
    /// email trimmed (an empty email becomes `None`).
    pub fn validated(&self) -> Result<CustomerDetails, ValidationError> {
        validation::require("first_name", &self.first_name)?;
        validation::require("last_name", &self.last_name)?;
        validation::validate_phone(&self.phone)?;
        let email = validation::validate_email(self.email.as_deref())?;
        Ok(CustomerDetails {
            email,
            ..self.clone()
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub business_id: String,
    #[serde(flatten)]
    pub details: CustomerDetails,
    #[serde(default)]
    pub notes: Vec<String>,
    pub credit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        id: impl Into<String>,
        business_id: impl Into<String>,
        details: CustomerDetails,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            business_id: business_id.into(),
            details,
            notes: Vec::new(),
            credit: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Record for Customer {
    const KIND: RecordKind = RecordKind::Customer;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.details.full_name(), self.details.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_trims_blank_email() {
        let details = CustomerDetails::new("Ada", "Lovelace", "555-123-4567").with_email("   ");
        let checked = details.validated().unwrap();
        assert_eq!(checked.email, None);
    }

    #[test]
    fn test_validated_rejects_bad_email() {
        let details = CustomerDetails::new("Ada", "Lovelace", "5551234567").with_email("not-an-email");
        assert!(matches!(
            details.validated(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validated_requires_names() {
        let details = CustomerDetails::new("", "Lovelace", "5551234567");
        assert_eq!(
            details.validated(),
            Err(ValidationError::Required("first_name"))
        );
    }

    #[test]
    fn test_display() {
        let customer = Customer::new(
            "c1",
            "b1",
            CustomerDetails::new("Ada", "Lovelace", "5551234567"),
        );
        assert_eq!(customer.to_string(), "Ada Lovelace <5551234567>");
    }
}
