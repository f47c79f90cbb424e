//! `reqwest` implementation of the shop REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, CheckoutApi, CheckoutVerificationInput, VerifiedResponse};
use crate::config::ApiConfig;

/// Path of the verification endpoint, relative to the API base URL.
const VERIFY_CHECKOUT_PATH: &str = "orders/checkout/verify";

/// Client for the shop REST API.
#[derive(Clone)]
pub struct CheckoutClient {
    inner: Arc<CheckoutClientInner>,
}

struct CheckoutClientInner {
    client: reqwest::Client,
    verify_endpoint: Url,
    token: Option<SecretString>,
}

/// Error body returned by the API on non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl CheckoutClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the base URL cannot
    /// address the verification endpoint.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let verify_endpoint = config.base_url.join(VERIFY_CHECKOUT_PATH)?;

        Ok(Self {
            inner: Arc::new(CheckoutClientInner {
                client,
                verify_endpoint,
                token: config.token.clone(),
            }),
        })
    }

    /// The fully resolved verification endpoint.
    #[must_use]
    pub fn verify_endpoint(&self) -> &Url {
        &self.inner.verify_endpoint
    }
}

#[async_trait]
impl CheckoutApi for CheckoutClient {
    #[instrument(skip(self, input), fields(products = input.products.len(), amount = %input.amount))]
    async fn verify_checkout(
        &self,
        input: CheckoutVerificationInput,
    ) -> Result<VerifiedResponse, ApiError> {
        let mut request = self
            .inner
            .client
            .post(self.inner.verify_endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(&input);

        if let Some(token) = &self.inner.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Checkout verification returned non-success status"
            );
            let message = serde_json::from_str::<ErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let verified: VerifiedResponse = match serde_json::from_str(&response_text) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse checkout verification response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        debug!("Checkout verified");
        Ok(verified)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_endpoint_joins_base_path() {
        let config = ApiConfig::new("https://api.shop.test/rest").unwrap();
        let client = CheckoutClient::new(&config).unwrap();
        assert_eq!(
            client.verify_endpoint().as_str(),
            "https://api.shop.test/rest/orders/checkout/verify"
        );
    }
}
