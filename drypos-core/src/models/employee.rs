use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::{Record, RecordKind};
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeRole {
    Owner,
    Manager,
    #[default]
    Staff,
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeRole::Owner => write!(f, "owner"),
            EmployeeRole::Manager => write!(f, "manager"),
            EmployeeRole::Staff => write!(f, "staff"),
        }
    }
}

impl FromStr for EmployeeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(EmployeeRole::Owner),
            "manager" => Ok(EmployeeRole::Manager),
            "staff" => Ok(EmployeeRole::Staff),
            _ => Err(format!(
                "Invalid employee role '{}'. Valid options: owner, manager, staff",
                s
            )),
        }
    }
}

/// A person working the counter. `pin` signs them in on a shared device and
/// is unique within the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub business_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub dob: Option<NaiveDate>,
    pub pin: Option<String>,
    #[serde(default)]
    pub role: EmployeeRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        business_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            business_id: business_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            dob: None,
            pin: None,
            role: EmployeeRole::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn with_role(mut self, role: EmployeeRole) -> Self {
        self.role = role;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns a copy with the email trimmed and the PIN normalized; blank
    /// values become `None`.
    pub fn validated(&self) -> Result<Employee, ValidationError> {
        validation::require("first_name", &self.first_name)?;
        validation::require("last_name", &self.last_name)?;
        validation::validate_phone(&self.phone)?;
        let email = validation::validate_email(self.email.as_deref())?;
        let pin = match self.pin.as_deref().map(str::trim) {
            Some(pin) if !pin.is_empty() => Some(validation::validate_pin(pin)?),
            _ => None,
        };
        Ok(Employee {
            email,
            pin,
            ..self.clone()
        })
    }
}

impl Record for Employee {
    const KIND: RecordKind = RecordKind::Employee;

    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_normalizes_pin() {
        let employee = Employee::new("e1", "b1", "Sam", "Rivera", "5551234567").with_pin(" 1234 ");
        assert_eq!(employee.validated().unwrap().pin.as_deref(), Some("1234"));

        let blank = Employee::new("e1", "b1", "Sam", "Rivera", "5551234567").with_pin("  ");
        assert_eq!(blank.validated().unwrap().pin, None);

        let bad = Employee::new("e1", "b1", "Sam", "Rivera", "5551234567").with_pin("12");
        assert_eq!(bad.validated(), Err(ValidationError::InvalidPin));
    }

    #[test]
    fn test_role_defaults_to_staff() {
        let employee = Employee::new("e1", "b1", "Sam", "Rivera", "5551234567");
        assert_eq!(employee.role, EmployeeRole::Staff);
        assert_eq!("Manager".parse::<EmployeeRole>().unwrap(), EmployeeRole::Manager);
        assert!("boss".parse::<EmployeeRole>().is_err());
    }

    #[test]
    fn test_display() {
        let employee = Employee::new("e1", "b1", "Sam", "Rivera", "5551234567")
            .with_role(EmployeeRole::Owner);
        assert_eq!(employee.to_string(), "Sam Rivera (owner)");
    }
}
