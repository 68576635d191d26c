use async_trait::async_trait;

use super::{RemoteError, RemoteSource};
use crate::models::{Business, BusinessDetails};

/// Stand-in used when no remote service is configured.
///
/// Every call reports [`RemoteError::Unavailable`], so reads fall back to
/// local data and creates that need a remote id fail loudly.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemote;

const NOT_CONFIGURED: &str = "no remote service configured";

#[async_trait]
impl RemoteSource for OfflineRemote {
    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<Business>, RemoteError> {
        Err(RemoteError::Unavailable(NOT_CONFIGURED.to_string()))
    }

    async fn create_business(
        &self,
        _owner_id: &str,
        _details: &BusinessDetails,
    ) -> Result<Business, RemoteError> {
        Err(RemoteError::Unavailable(NOT_CONFIGURED.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_remote_is_unavailable() {
        let remote = OfflineRemote;
        let err = remote.list_by_owner("owner-1").await.unwrap_err();
        assert!(err.is_transient());

        let details = BusinessDetails::new("Press & Fold", "5551234567");
        let err = remote.create_business("owner-1", &details).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
    }
}
