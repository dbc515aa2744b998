// # HTTP IP Source
//
// This crate provides the HTTP "echo my IP" resolver for the Route 53 DDNS
// system.
//
// ## Behavior
//
// - One GET to the configured URL per `current()` call, nothing cached
// - Every request is bounded by the client timeout
// - The body must be a bare address, optionally followed by one newline
//
// Services known to answer in that format:
// - https://checkip.amazonaws.com
// - https://api.ipify.org
// - https://icanhazip.com

use r53ddns_core::traits::{IpSource, ObservedAddress};
use r53ddns_core::{Error, Result};

use std::time::Duration;

/// Default timeout for echo service requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://checkip.amazonaws.com")
    /// - `timeout`: Upper bound for connecting plus reading the response
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<ObservedAddress> {
        // The response (and its connection) is dropped on every return path
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "{} answered with HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        let address = ObservedAddress::parse(&body)?;
        tracing::debug!("{} reports public address {}", self.url, address);

        Ok(address)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
