//! Address and reputation providers.

pub mod abuseipdb;
pub mod ipify;

#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;

/// Result of a reputation check.
///
/// Query failures are carried as data so they can be logged like any
/// other outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReputationResult {
    /// The query failed; holds the failure description.
    Error(String),
    /// The service answered.
    Report(ReputationReport),
}

impl ReputationResult {
    /// Build the error variant from a provider error.
    pub fn from_error(error: &ProviderError) -> Self {
        ReputationResult::Error(error.to_string())
    }
}

/// Reputation details for a single address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReputationReport {
    pub ip: String,
    /// Abuse confidence score (0-100, higher = worse).
    pub abuse_score: u8,
    pub country_code: Option<String>,
    pub isp: Option<String>,
    pub domain: Option<String>,
    pub is_whitelisted: bool,
    pub last_reported_at: Option<String>,
}

impl ReputationReport {
    /// Whether the score is above the malicious threshold.
    pub fn is_likely_malicious(&self, malicious_above: u8) -> bool {
        self.abuse_score > malicious_above
    }
}

/// Error from a provider.
#[derive(Debug)]
pub enum ProviderError {
    /// HTTP request failed.
    Http(reqwest::Error),
    /// Timeout.
    Timeout,
    /// Rate limited.
    RateLimited,
    /// Invalid response.
    InvalidResponse(String),
    /// Other error.
    Other(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Http(e) => write!(f, "HTTP error: {}", e),
            ProviderError::Timeout => write!(f, "Request timed out"),
            ProviderError::RateLimited => write!(f, "Rate limited"),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(e)
        }
    }
}

/// Build an HTTP client, optionally with a request timeout.
pub(crate) fn build_client(timeout_ms: Option<u64>) -> Result<reqwest::Client, ProviderError> {
    let mut builder = reqwest::Client::builder();
    if let Some(ms) = timeout_ms {
        builder = builder.timeout(std::time::Duration::from_millis(ms));
    }
    builder
        .build()
        .map_err(|e| ProviderError::Other(format!("Failed to create HTTP client: {}", e)))
}

/// Resolves the caller's public IP address.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self) -> Result<String, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Looks up the reputation of an address.
#[async_trait]
pub trait ReputationProvider: Send + Sync {
    /// Check an address. Failures come back as [`ReputationResult::Error`].
    async fn check(&self, ip: &str, api_key: &str) -> ReputationResult;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
