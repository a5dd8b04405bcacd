//! Public address resolution via a plain-text echo service.

use super::{build_client, AddressResolver, ProviderError};
use crate::config::AddressConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Resolves the public IP from an endpoint that echoes it as plain text.
pub struct IpifyResolver {
    config: AddressConfig,
    client: Client,
}

impl IpifyResolver {
    /// Create a new resolver.
    pub fn new(config: AddressConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.timeout_ms)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a resolver using an existing HTTP client.
    pub fn with_client(config: AddressConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl AddressResolver for IpifyResolver {
    async fn resolve(&self) -> Result<String, ProviderError> {
        debug!(url = %self.config.url, "Resolving public address");

        let response = self.client.get(&self.config.url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::InvalidResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to read response: {}", e))
        })?;

        let address = body.trim();
        if address.is_empty() {
            return Err(ProviderError::InvalidResponse("empty body".to_string()));
        }

        debug!(address = %address, "Public address resolved");
        Ok(address.to_string())
    }

    fn name(&self) -> &str {
        "ipify"
    }
}
