//! Shop REST API client for checkout verification.
//!
//! # Architecture
//!
//! - [`CheckoutApi`] is the seam the verification workflow calls through, so
//!   the workflow can run against fakes in tests
//! - [`CheckoutClient`] is the `reqwest` implementation talking to the shop API
//! - The shop API is the source of truth for availability, tax and shipping.
//!   Nothing is cached locally
//!
//! # Example
//!
//! ```rust,ignore
//! use quickcart_storefront::api::{CheckoutApi, CheckoutClient};
//!
//! let client = CheckoutClient::new(&config.api)?;
//! let verified = client.verify_checkout(input).await?;
//! println!("tax: {:?}", verified.total_tax());
//! ```

mod client;
pub mod types;

pub use client::CheckoutClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when calling the shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API rejected request ({status}): {}", .message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        status: u16,
        /// The `message` field of the error body, when there was one.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot address an endpoint.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The human-readable message the API sent back, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Remote checkout operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// Ask the shop whether the cart can be delivered to the given addresses.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the shop rejects the cart.
    async fn verify_checkout(
        &self,
        input: CheckoutVerificationInput,
    ) -> Result<VerifiedResponse, ApiError>;
}
