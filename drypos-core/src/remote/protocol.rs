//! Wire types for the remote record service.
//!
//! The service speaks JSON with camelCase field names and wraps every
//! payload in an envelope:
//!
//! ```text
//! { "data": <payload or null>, "errors": [{ "message": "..." }] }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RemoteError;
use crate::models::{Business, BusinessDetails};

/// Response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<RemoteErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteErrorEntry {
    pub message: String,
}

impl<T> Envelope<T> {
    /// Returns the payload, or the first reported error as
    /// [`RemoteError::Rejected`].
    pub fn into_data(self) -> Result<T, RemoteError> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(RemoteError::Rejected(first.message));
        }
        self.data
            .ok_or_else(|| RemoteError::Malformed("response carried no data".to_string()))
    }
}

/// A business as the remote service represents it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBusiness {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub hours: Vec<String>,
    pub logo_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteBusiness {
    /// Converts to the local record. Missing timestamps default to `now`.
    pub fn into_business(self, now: DateTime<Utc>) -> Business {
        let created_at = self.created_at.unwrap_or(now);
        let updated_at = self.updated_at.unwrap_or(created_at);
        let details = BusinessDetails {
            business_name: self.name,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone_number,
            email: self.email,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            website: self.website,
            hours: self.hours,
            logo_url: self.logo_url,
            logo_source: None,
        };
        Business {
            id: self.id,
            owner_id: self.user_id,
            details,
            created_at,
            updated_at,
        }
    }
}

/// Request body for creating a business.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessInput<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone_number: &'a str,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub website: Option<&'a str>,
    pub hours: &'a [String],
    pub logo_url: Option<&'a str>,
}

impl<'a> CreateBusinessInput<'a> {
    pub fn new(owner_id: &'a str, details: &'a BusinessDetails) -> Self {
        Self {
            user_id: owner_id,
            name: &details.business_name,
            first_name: details.first_name.as_deref(),
            last_name: details.last_name.as_deref(),
            phone_number: &details.phone,
            email: details.email.as_deref(),
            address: details.address.as_deref(),
            city: details.city.as_deref(),
            state: details.state.as_deref(),
            zip_code: details.zip_code.as_deref(),
            website: details.website.as_deref(),
            hours: &details.hours,
            logo_url: details.logo_url.as_deref(),
        }
    }
}
