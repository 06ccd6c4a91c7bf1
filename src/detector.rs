//! Public IP detection.

use crate::error::{DdnsError, Result};
use serde::Deserialize;
use std::net::Ipv4Addr;
use url::Url;

/// Body returned by the lookup service.
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    ip: String,
}

/// Resolves the public IPv4 address through a single JSON lookup service.
pub struct IpDetector {
    client: reqwest::Client,
    endpoint: Url,
}

impl IpDetector {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Ask the lookup service for our address.
    ///
    /// Returns `Ok(None)` when the service cannot be reached or does not answer with JSON.
    /// A JSON answer without a string `ip` field is an [`DdnsError::InvalidApiResponse`],
    /// whatever the HTTP status. The address is returned verbatim.
    pub async fn resolve_public_ipv4(&self) -> Result<Option<String>> {
        let body = match self.fetch_body().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("IP lookup via {} failed: {}", self.endpoint, e);
                return Ok(None);
            }
        };

        let response: IpLookupResponse = serde_json::from_value(body).map_err(|e| {
            DdnsError::InvalidApiResponse(format!("IPv4 lookup via {}: {}", self.endpoint, e))
        })?;

        if response.ip.parse::<Ipv4Addr>().is_err() {
            tracing::warn!("Lookup service returned non-IPv4 address {:?}", response.ip);
        }

        tracing::debug!("Detected IPv4 {} from {}", response.ip, self.endpoint);
        Ok(Some(response.ip))
    }

    /// Transport-level part of the lookup. Errors here mean "no address", not a bad API.
    async fn fetch_body(&self) -> std::result::Result<serde_json::Value, String> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("IP lookup via {} answered HTTP {}", self.endpoint, status);
        }

        let text = response.text().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&text)
            .map_err(|e| format!("HTTP {} response is not JSON: {}", status, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{build_client, build_client_with_timeout};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn detector_for(server: &MockServer) -> IpDetector {
        let endpoint = Url::parse(&format!("{}/ip", server.uri())).unwrap();
        IpDetector::new(build_client().unwrap(), endpoint)
    }

    #[tokio::test]
    async fn test_returns_ip_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ip": "203.0.113.5"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);
        let ip = detector.resolve_public_ipv4().await.unwrap();

        assert_eq!(ip, Some("203.0.113.5".to_string()));
    }

    #[tokio::test]
    async fn test_non_ipv4_value_is_still_returned() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ip": "not-an-ip"})),
            )
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);
        let ip = detector.resolve_public_ipv4().await.unwrap();

        assert_eq!(ip.as_deref(), Some("not-an-ip"));
    }

    #[tokio::test]
    async fn test_missing_ip_field_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"address": "1.2.3.4"})),
            )
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);
        let result = detector.resolve_public_ipv4().await;

        assert!(matches!(result, Err(DdnsError::InvalidApiResponse(_))));
    }

    #[tokio::test]
    async fn test_non_json_body_is_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.5\n"))
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);

        assert_eq!(detector.resolve_public_ipv4().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_without_json_is_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);

        assert_eq!(detector.resolve_public_ipv4().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_with_json_missing_ip_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "x"})),
            )
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);
        let result = detector.resolve_public_ipv4().await;

        assert!(matches!(result, Err(DdnsError::InvalidApiResponse(_))));
    }

    #[tokio::test]
    async fn test_error_status_with_ip_returns_address() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(serde_json::json!({"ip": "203.0.113.5"})),
            )
            .mount(&mock_server)
            .await;

        let detector = detector_for(&mock_server);

        assert_eq!(
            detector.resolve_public_ipv4().await.unwrap().as_deref(),
            Some("203.0.113.5")
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_absent() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = Url::parse(&format!("http://{}/ip", addr)).unwrap();
        let detector = IpDetector::new(build_client().unwrap(), endpoint);

        assert_eq!(detector.resolve_public_ipv4().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_timeout_is_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ip": "203.0.113.5"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let endpoint = Url::parse(&mock_server.uri()).unwrap();
        let client = build_client_with_timeout(Duration::from_millis(200)).unwrap();
        let detector = IpDetector::new(client, endpoint);

        assert_eq!(detector.resolve_public_ipv4().await.unwrap(), None);
    }
}
