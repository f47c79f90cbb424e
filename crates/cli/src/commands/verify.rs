//! Checkout verification command.
//!
//! Loads a checkout (cart items plus addresses) from JSON, runs it through
//! the same verification workflow the storefront uses, and prints the
//! resulting order summary.
//!
//! # Checkout File
//!
//! ```json
//! {
//!   "items": [
//!     { "id": "1", "product_id": 1, "name": "Pineapple", "unit_price": "100", "quantity": 1 }
//!   ],
//!   "billing_address": { "type": "billing", "address": { "city": "Austin" } },
//!   "shipping_address": { "type": "shipping", "address": { "city": "Austin" } }
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `QUICKCART_API_URL` - Shop REST API base URL
//! - `QUICKCART_API_TOKEN` - Optional customer bearer token

use std::path::Path;
use std::sync::Arc;

use quickcart_core::{Address, VerificationPhase};
use quickcart_storefront::VerificationTrigger;
use quickcart_storefront::api::{ApiError, CheckoutClient};
use quickcart_storefront::cart::{CartError, CartItem, CartStore};
use quickcart_storefront::config::CheckoutConfig;
use quickcart_storefront::i18n::{Catalog, CatalogError, keys};
use quickcart_storefront::state::{CheckoutAction, CheckoutState};
use quickcart_storefront::summary::OrderSummary;
use quickcart_storefront::trigger::TriggerError;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during the verify command.
#[derive(Debug, Error)]
pub enum VerifyCommandError {
    #[error("failed to read checkout file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid checkout file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("API client error: {0}")]
    Api(#[from] ApiError),
    #[error("cart error: {0}")]
    Cart(#[from] CartError),
    #[error("trigger error: {0}")]
    Trigger(#[from] TriggerError),
    #[error("checkout file has no items")]
    EmptyCart,
    #[error("checkout not verified ({phase}): {}", .message.as_deref().unwrap_or("no message from the shop"))]
    NotVerified {
        phase: VerificationPhase,
        message: Option<String>,
    },
}

/// Checkout loaded from a JSON file.
#[derive(Debug, Deserialize)]
pub struct CheckoutFile {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
}

/// Run one verification and print the order summary.
///
/// # Errors
///
/// Returns an error if the files cannot be loaded, or if the checkout ends in
/// any phase other than `Success`.
pub async fn run(
    config: &CheckoutConfig,
    checkout_path: &Path,
    catalog_path: Option<&Path>,
) -> Result<(), VerifyCommandError> {
    let checkout: CheckoutFile =
        serde_json::from_str(&tokio::fs::read_to_string(checkout_path).await?)?;
    if checkout.items.is_empty() {
        return Err(VerifyCommandError::EmptyCart);
    }

    let catalog = match catalog_path {
        Some(path) => Catalog::english().merged_with(Catalog::from_file(path)?),
        None => Catalog::english(),
    };

    let client = CheckoutClient::new(&config.api)?;
    info!(endpoint = %client.verify_endpoint(), items = checkout.items.len(), "Loaded checkout");

    let cart = CartStore::new();
    let state = CheckoutState::new();
    state.dispatch(CheckoutAction::SetBillingAddress(checkout.billing_address));
    state.dispatch(CheckoutAction::SetShippingAddress(checkout.shipping_address));

    for item in checkout.items {
        cart.add_item(item)?;
    }

    // Mounting on the filled cart verifies the whole checkout in one request.
    let trigger = VerificationTrigger::new(Arc::new(client), cart.clone(), state.clone())?;
    trigger.mount()?;
    if trigger.is_loading() {
        print_loading(&catalog);
    }
    let status = trigger.settled().await;
    trigger.unmount()?;

    let summary = OrderSummary::build(
        &cart.snapshot()?,
        state.verified_response().as_ref(),
        config.currency,
    );
    print_summary(&summary, &catalog);

    if status.phase == VerificationPhase::Success {
        Ok(())
    } else {
        Err(VerifyCommandError::NotVerified {
            phase: status.phase,
            message: status
                .error
                .map(|key| catalog.translate(&key).to_string()),
        })
    }
}

#[allow(clippy::print_stdout)]
fn print_loading(catalog: &Catalog) {
    println!("{}", catalog.translate(keys::TEXT_LOADING));
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &OrderSummary, catalog: &Catalog) {
    for line in &summary.lines {
        let marker = if line.unavailable {
            format!("  [{}]", catalog.translate(keys::TEXT_UNAVAILABLE))
        } else {
            String::new()
        };
        println!(
            "{:>3} x {:<30} {:>12}{marker}",
            line.quantity,
            line.name,
            line.line_total.display()
        );
    }
    println!();
    for (label, value) in summary.rows(catalog) {
        println!("{label:<36} {value:>12}");
    }
}
