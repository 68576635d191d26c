//! Field validation and normalization shared by every write path.
//!
//! All checks here run before a store transaction is opened, so a rejected
//! input never reaches the database.

use rust_decimal::Decimal;
use thiserror::Error;

/// Minimum number of digits in a phone number once formatting is stripped.
pub const MIN_PHONE_DIGITS: usize = 10;

pub const MIN_PIN_DIGITS: usize = 4;
pub const MAX_PIN_DIGITS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid phone number '{0}': at least 10 digits are required")]
    InvalidPhone(String),

    #[error("Invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("Invalid PIN: 4 to 8 digits are required")]
    InvalidPin,

    #[error("{field} must not be negative")]
    Negative { field: &'static str },
}

/// Strips everything but ASCII digits, so `"555-123-4567"` and
/// `"5551234567"` normalize to the same value.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validates a phone number and returns its normalized digits.
pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let digits = normalize_phone(raw);
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone(raw.to_string()));
    }
    Ok(digits)
}

/// Canonical form used when comparing emails.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validates an optional email. Blank input is treated as absent; otherwise
/// the trimmed address is returned.
pub fn validate_email(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(email) = raw.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    if !validator::validate_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(Some(email.to_string()))
}

/// Validates an employee sign-in PIN: ASCII digits only, surrounding
/// whitespace ignored. The PIN itself is never echoed in the error.
pub fn validate_pin(raw: &str) -> Result<String, ValidationError> {
    let pin = raw.trim();
    let digits_only = pin.chars().all(|c| c.is_ascii_digit());
    if !digits_only || pin.len() < MIN_PIN_DIGITS || pin.len() > MAX_PIN_DIGITS {
        return Err(ValidationError::InvalidPin);
    }
    Ok(pin.to_string())
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("555-123-4567"), "5551234567");
        assert_eq!(normalize_phone("(555) 123 4567"), "5551234567");
        assert_eq!(normalize_phone("+1 555.123.4567"), "15551234567");
        assert_eq!(normalize_phone("555-123-4567"), normalize_phone("5551234567"));
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("555-123-4567").unwrap(), "5551234567");
        assert!(validate_phone("555-1234").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(None).unwrap(), None);
        assert_eq!(validate_email(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_email(Some(" ada@example.com ")).unwrap(),
            Some("ada@example.com".to_string())
        );
        assert!(validate_email(Some("ada@")).is_err());
        assert!(validate_email(Some("no at sign")).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_validate_pin() {
        assert_eq!(validate_pin(" 0420 ").unwrap(), "0420");
        assert_eq!(validate_pin("123"), Err(ValidationError::InvalidPin));
        assert_eq!(validate_pin("12a4"), Err(ValidationError::InvalidPin));
        assert_eq!(validate_pin("123456789"), Err(ValidationError::InvalidPin));
    }

    #[test]
    fn test_require() {
        assert!(require("name", "Shirt").is_ok());
        assert_eq!(require("name", "   "), Err(ValidationError::Required("name")));
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("price", dec!(0)).is_ok());
        assert!(non_negative("price", dec!(12.50)).is_ok());
        assert_eq!(
            non_negative("price", dec!(-0.01)),
            Err(ValidationError::Negative { field: "price" })
        );
    }
}
