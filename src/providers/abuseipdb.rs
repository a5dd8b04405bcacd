//! AbuseIPDB reputation provider.

use super::{build_client, ProviderError, ReputationProvider, ReputationReport, ReputationResult};
use crate::config::AbuseIPDBConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// AbuseIPDB API response.
#[derive(Debug, Deserialize)]
struct AbuseIPDBResponse {
    data: AbuseIPDBData,
}

/// AbuseIPDB API response data.
#[derive(Debug, Deserialize)]
struct AbuseIPDBData {
    #[serde(rename = "ipAddress")]
    ip_address: String,

    /// Abuse confidence score (0-100).
    #[serde(rename = "abuseConfidenceScore")]
    abuse_confidence_score: u8,

    #[serde(rename = "countryCode", default)]
    country_code: Option<String>,

    #[serde(default)]
    isp: Option<String>,

    #[serde(default)]
    domain: Option<String>,

    /// Null for addresses AbuseIPDB has no opinion on.
    #[serde(rename = "isWhitelisted", default)]
    is_whitelisted: Option<bool>,

    /// Null when the address was never reported.
    #[serde(rename = "lastReportedAt", default)]
    last_reported_at: Option<String>,
}

impl From<AbuseIPDBData> for ReputationReport {
    fn from(data: AbuseIPDBData) -> Self {
        Self {
            ip: data.ip_address,
            abuse_score: data.abuse_confidence_score,
            country_code: data.country_code,
            isp: data.isp,
            domain: data.domain,
            is_whitelisted: data.is_whitelisted.unwrap_or(false),
            last_reported_at: data.last_reported_at,
        }
    }
}

/// AbuseIPDB reputation provider.
pub struct AbuseIPDBProvider {
    config: AbuseIPDBConfig,
    client: Client,
}

impl AbuseIPDBProvider {
    /// Create a new AbuseIPDB provider.
    pub fn new(config: AbuseIPDBConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.timeout_ms)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a provider using an existing HTTP client.
    pub fn with_client(config: AbuseIPDBConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Query the check endpoint once. No retries.
    async fn lookup(&self, ip: &str, api_key: &str) -> Result<ReputationReport, ProviderError> {
        debug!(ip = %ip, "Querying AbuseIPDB");

        let max_age = self.config.max_age_days.to_string();
        let response = self
            .client
            .get(&self.config.url)
            .query(&[("ipAddress", ip), ("maxAgeInDays", max_age.as_str())])
            .header("Key", api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("AbuseIPDB rate limit exceeded");
            return Err(ProviderError::RateLimited);
        }

        // Check for other errors
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::InvalidResponse(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        let api_response: AbuseIPDBResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let report = ReputationReport::from(api_response.data);

        debug!(
            ip = %report.ip,
            score = report.abuse_score,
            whitelisted = report.is_whitelisted,
            "AbuseIPDB lookup complete"
        );

        Ok(report)
    }
}

#[async_trait]
impl ReputationProvider for AbuseIPDBProvider {
    async fn check(&self, ip: &str, api_key: &str) -> ReputationResult {
        match self.lookup(ip, api_key).await {
            Ok(report) => ReputationResult::Report(report),
            Err(e) => {
                warn!(ip = %ip, error = %e, "AbuseIPDB lookup failed");
                ReputationResult::from_error(&e)
            }
        }
    }

    fn name(&self) -> &str {
        "abuseipdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::{direct_client, StubServer};

    const SAMPLE: &str = r#"{"data":{"ipAddress":"203.0.113.7","abuseConfidenceScore":75,"countryCode":"US","isp":"ExampleISP","domain":"example.com","isWhitelisted":false,"lastReportedAt":"2024-01-01T00:00:00+00:00"}}"#;

    fn provider(url: String) -> AbuseIPDBProvider {
        AbuseIPDBProvider::with_client(
            AbuseIPDBConfig {
                url,
                max_age_days: 90,
                timeout_ms: None,
            },
            direct_client(),
        )
    }

    #[tokio::test]
    async fn test_check_success() {
        let server = StubServer::start(200, SAMPLE).await;
        let result = provider(server.url.clone()).check("203.0.113.7", "abc123").await;

        assert_eq!(
            result,
            ReputationResult::Report(ReputationReport {
                ip: "203.0.113.7".to_string(),
                abuse_score: 75,
                country_code: Some("US".to_string()),
                isp: Some("ExampleISP".to_string()),
                domain: Some("example.com".to_string()),
                is_whitelisted: false,
                last_reported_at: Some("2024-01-01T00:00:00+00:00".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_check_sends_key_and_query() {
        let server = StubServer::start(200, SAMPLE).await;
        provider(server.url.clone()).check("203.0.113.7", "abc123").await;

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let head = requests[0].to_lowercase();
        assert!(head.starts_with("get /?ipaddress=203.0.113.7&maxageindays=90 "));
        assert!(head.contains("\r\nkey: abc123\r\n"));
        assert!(head.contains("\r\naccept: application/json\r\n"));
    }

    #[tokio::test]
    async fn test_check_null_fields() {
        let body = r#"{"data":{"ipAddress":"198.51.100.1","abuseConfidenceScore":0,"countryCode":null,"isp":"ExampleISP","domain":null,"isWhitelisted":null,"lastReportedAt":null}}"#;
        let server = StubServer::start(200, body).await;

        match provider(server.url.clone()).check("198.51.100.1", "k").await {
            ReputationResult::Report(report) => {
                assert_eq!(report.abuse_score, 0);
                assert!(report.country_code.is_none());
                assert!(report.domain.is_none());
                assert!(!report.is_whitelisted);
                assert!(report.last_reported_at.is_none());
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_http_error_is_error_variant() {
        let body = r#"{"errors":[{"detail":"Authentication failed"}]}"#;
        let server = StubServer::start(401, body).await;

        match provider(server.url.clone()).check("203.0.113.7", "bad").await {
            ReputationResult::Error(msg) => {
                assert!(msg.contains("HTTP 401"));
                assert!(msg.contains("Authentication failed"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_rate_limited() {
        let server = StubServer::start(429, "").await;
        let result = provider(server.url.clone()).check("203.0.113.7", "k").await;
        assert_eq!(result, ReputationResult::Error("Rate limited".to_string()));
    }

    #[tokio::test]
    async fn test_check_invalid_json() {
        let server = StubServer::start(200, "not json").await;
        match provider(server.url.clone()).check("203.0.113.7", "k").await {
            ReputationResult::Error(msg) => assert!(msg.starts_with("Invalid response")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_connection_refused() {
        let url = StubServer::closed_url().await;
        match provider(url).check("203.0.113.7", "k").await {
            ReputationResult::Error(msg) => assert!(msg.starts_with("HTTP error")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(provider("http://127.0.0.1".to_string()).name(), "abuseipdb");
    }
}
