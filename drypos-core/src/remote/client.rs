//! HTTP client for the remote record service.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::protocol::{CreateBusinessInput, Envelope, RemoteBusiness};
use super::{RemoteError, RemoteSource};
use crate::models::{Business, BusinessDetails};

/// Remote source backed by the service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpRemoteSource {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl HttpRemoteSource {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the server URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an absolute URL for an API path.
    ///
    /// A bare host gets an `https://` scheme; trailing slashes on the base
    /// are ignored.
    pub(crate) fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let base = if base.starts_with("http://") || base.starts_with("https://") {
            base.to_string()
        } else {
            format!("https://{}", base)
        };
        format!("{}{}", base, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;
        envelope.into_data()
    }
}

/// Maps a non-success HTTP status to the matching error kind.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> RemoteError {
    let detail = if body.trim().is_empty() {
        format!("server returned status {}", status)
    } else {
        format!("server returned status {}: {}", status, body.trim())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Auth(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            RemoteError::Unavailable(detail)
        }
        s if s.is_server_error() => RemoteError::Unavailable(detail),
        _ => RemoteError::Rejected(detail),
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, RemoteError> {
        let url = self.build_url("/businesses");
        let request = self.http.get(&url).query(&[("ownerId", owner_id)]);

        let records: Vec<RemoteBusiness> = self.send(request).await?;
        tracing::debug!(
            owner_id,
            count = records.len(),
            "Remote returned business candidates"
        );

        let now = Utc::now();
        Ok(records.into_iter().map(|r| r.into_business(now)).collect())
    }

    async fn create_business(
        &self,
        owner_id: &str,
        details: &BusinessDetails,
    ) -> Result<Business, RemoteError> {
        let url = self.build_url("/businesses");
        let input = CreateBusinessInput::new(owner_id, details);
        let request = self.http.post(&url).json(&input);

        let created: RemoteBusiness = self.send(request).await?;
        tracing::info!(owner_id, business_id = %created.id, "Created business remotely");
        Ok(created.into_business(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_https() {
        let client = HttpRemoteSource::new("https://api.example.com", None);
        assert_eq!(
            client.build_url("/businesses"),
            "https://api.example.com/businesses"
        );
    }

    #[test]
    fn test_build_url_with_http_and_trailing_slash() {
        let client = HttpRemoteSource::new("http://localhost:8080/", None);
        assert_eq!(
            client.build_url("/businesses"),
            "http://localhost:8080/businesses"
        );
    }

    #[test]
    fn test_build_url_bare_host() {
        let client = HttpRemoteSource::new("api.example.com/v1", Some("key".to_string()));
        assert_eq!(
            client.build_url("/businesses"),
            "https://api.example.com/v1/businesses"
        );
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, ""),
            RemoteError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "expired token"),
            RemoteError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, ""),
            RemoteError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            RemoteError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNPROCESSABLE_ENTITY, "bad phone"),
            RemoteError::Rejected(_)
        ));
    }

    #[test]
    fn test_classify_status_includes_body() {
        let err = classify_status(StatusCode::BAD_REQUEST, " missing name ");
        assert_eq!(
            err,
            RemoteError::Rejected("server returned status 400 Bad Request: missing name".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = HttpRemoteSource::new("http://127.0.0.1:9", None);
        let err = client.list_by_owner("owner-1").await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
    }
}
