//! Access to the authoritative remote record service.
//!
//! The remote service owns the canonical business record for each account.
//! This module exposes it through the [`RemoteSource`] trait:
//! 1. `list_by_owner` returns every candidate business for an owner id
//! 2. `create_business` creates one and returns it with its assigned id
//!
//! Neither call has local side effects, and neither imposes a timeout;
//! callers wrap calls with their own deadline.

mod client;
mod error;
mod offline;
mod protocol;

use async_trait::async_trait;

use crate::models::{Business, BusinessDetails};

pub use client::HttpRemoteSource;
pub use error::RemoteError;
pub use offline::OfflineRemote;
pub use protocol::{CreateBusinessInput, Envelope, RemoteBusiness, RemoteErrorEntry};

#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Lists business records whose owner id matches `owner_id`, in the
    /// order the service returns them.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, RemoteError>;

    /// Creates a business for `owner_id` and returns it with the id the
    /// service assigned.
    async fn create_business(
        &self,
        owner_id: &str,
        details: &BusinessDetails,
    ) -> Result<Business, RemoteError>;
}
