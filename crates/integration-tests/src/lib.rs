//! Integration tests for Quickcart.
//!
//! Tests run the real `reqwest` client and verification trigger against a
//! `wiremock` server standing in for the shop REST API, so they need no
//! network access or running services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quickcart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_api` - HTTP contract of the verification endpoint
//! - `verification_flow` - Cart, checkout state and trigger wired to the client

use std::sync::Arc;

use quickcart_core::{Address, AddressFields, AddressType, ProductId};
use quickcart_storefront::api::CheckoutClient;
use quickcart_storefront::cart::{CartItem, CartStore};
use quickcart_storefront::config::ApiConfig;
use quickcart_storefront::state::{CheckoutAction, CheckoutState};
use quickcart_storefront::VerificationTrigger;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the client posts verification requests to.
pub const VERIFY_PATH: &str = "/orders/checkout/verify";

/// Mock shop REST API.
pub struct ShopApiMock {
    pub server: MockServer,
}

impl ShopApiMock {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// API configuration pointing at the mock server.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> ApiConfig {
        ApiConfig::new(&self.server.uri()).expect("mock server URI is a valid URL")
    }

    /// API configuration with a customer bearer token.
    #[must_use]
    pub fn config_with_token(&self, token: &str) -> ApiConfig {
        let mut config = self.config();
        config.token = Some(SecretString::from(token.to_string()));
        config
    }

    /// Client for the mock server.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client(&self) -> CheckoutClient {
        CheckoutClient::new(&self.config()).expect("failed to build checkout client")
    }

    /// Answer every verification request with `200` and `body`.
    pub async fn mock_verify_success(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(VERIFY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer every verification request with `status` and `body`.
    pub async fn mock_verify_rejected(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(VERIFY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of all verification requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled or a body is not JSON.
    #[allow(clippy::expect_used)]
    pub async fn verify_requests(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
            .iter()
            .filter(|request| request.url.path() == VERIFY_PATH)
            .map(|request| request.body_json().expect("request body is JSON"))
            .collect()
    }
}

/// Cart, checkout state and a trigger wired to a real client.
pub struct CheckoutHarness {
    pub cart: CartStore,
    pub state: CheckoutState,
    pub trigger: VerificationTrigger,
}

impl CheckoutHarness {
    /// Build the workflow against `client`. Nothing is mounted yet.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(client: CheckoutClient) -> Self {
        let cart = CartStore::new();
        let state = CheckoutState::new();
        let trigger = VerificationTrigger::new(Arc::new(client), cart.clone(), state.clone())
            .expect("tests run inside a Tokio runtime");
        Self {
            cart,
            state,
            trigger,
        }
    }

    /// Set both addresses.
    #[must_use]
    pub fn with_addresses(self) -> Self {
        self.state
            .dispatch(CheckoutAction::SetBillingAddress(Some(billing_address())));
        self.state
            .dispatch(CheckoutAction::SetShippingAddress(Some(shipping_address())));
        self
    }
}

/// Cart line for product `product_id`.
#[must_use]
pub fn cart_item(product_id: i64, name: &str, unit_price: i64, quantity: u32) -> CartItem {
    CartItem {
        id: product_id.to_string(),
        product_id: ProductId::new(product_id),
        variation_id: None,
        name: name.to_string(),
        unit_price: Decimal::from(unit_price),
        quantity,
    }
}

/// Billing address in Austin.
#[must_use]
pub fn billing_address() -> Address {
    Address::new(
        AddressType::Billing,
        AddressFields {
            country: Some("US".to_string()),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip: Some("78701".to_string()),
            street_address: Some("1 Congress Ave".to_string()),
        },
    )
}

/// Shipping address in Portland.
#[must_use]
pub fn shipping_address() -> Address {
    Address::new(
        AddressType::Shipping,
        AddressFields {
            country: Some("US".to_string()),
            city: Some("Portland".to_string()),
            state: Some("OR".to_string()),
            zip: Some("97201".to_string()),
            street_address: Some("2 Main St".to_string()),
        },
    )
}
