use std::sync::Arc;

use rl_gate::RateGate;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::errors::HttpError;
use crate::errors::Result;
use crate::retry::RetryConfig;
use crate::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_REQUESTS_PER_SECOND: usize = 10;

/// Rate-limited HTTP client
///
/// Explicit stage composition: every logical request first clears the
/// admission gate, then runs through the retry stage, then the
/// transport. Retries re-send without re-entering the gate, so one
/// admission covers one logical request regardless of how many attempts
/// it takes.
pub struct GatedClient {
    client: HttpClient,
    gate: Arc<RateGate>,
    retry: RetryPolicy,
    base_url: Url,
}

impl GatedClient {
    /// Create a new client builder
    pub fn builder() -> GatedClientBuilder {
        GatedClientBuilder::default()
    }

    /// The admission gate guarding this client
    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    /// The base URL requests are issued against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issue a GET against `path`, waiting for admission first
    ///
    /// Returns [`HttpError::Cancelled`] if the token fires while waiting
    /// at the gate or between retry attempts. Transport errors and
    /// non-success statuses surface unchanged once retries are spent.
    pub async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<reqwest::Response> {
        let url = self.base_url.join(path)?;

        self.gate.admit_with(cancel).await?;

        let url = &url;
        let client = &self.client;
        self.retry
            .run(cancel, || async move {
                let response = client.get(url.as_str()).send().await?;
                if !response.status().is_success() {
                    return Err(HttpError::Status(response.status()));
                }
                Ok(response)
            })
            .await
    }
}

/// Builder for configuring a gated client
pub struct GatedClientBuilder {
    http_config: HttpClientConfig,
    retry_config: RetryConfig,
    base_url: String,
    requests_per_second: usize,
}

impl Default for GatedClientBuilder {
    fn default() -> Self {
        Self {
            http_config: HttpClientConfig::default(),
            retry_config: RetryConfig::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
        }
    }
}

impl GatedClientBuilder {
    /// Set the base URL requests are issued against
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Configure HTTP client settings
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure the retry stage
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Set the rate limit (requests per second)
    pub fn rate_limit(mut self, requests_per_second: usize) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    /// Build the gated client
    pub fn build(self) -> Result<GatedClient> {
        let client = HttpClient::with_config(self.http_config)?;
        let gate = RateGate::per_second(self.requests_per_second)?;
        let base_url = Url::parse(&self.base_url)?;

        Ok(GatedClient {
            client,
            gate: Arc::new(gate),
            retry: RetryPolicy::with_config(self.retry_config),
            base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_default() {
        let builder = GatedClientBuilder::default();
        assert_eq!(builder.base_url, DEFAULT_BASE_URL);
        assert_eq!(builder.requests_per_second, DEFAULT_REQUESTS_PER_SECOND);
    }

    #[test]
    fn test_builder_build() {
        let client = GatedClient::builder().rate_limit(25).build().unwrap();
        assert_eq!(client.gate().limit(), 25);
        assert_eq!(client.base_url().as_str(), "https://jsonplaceholder.typicode.com/");
    }

    #[test]
    fn test_builder_rejects_zero_rate() {
        let result = GatedClient::builder().rate_limit(0).build();
        assert!(matches!(result, Err(HttpError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_malformed_base_url() {
        let result = GatedClient::builder().base_url("not a url").build();
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }
}
