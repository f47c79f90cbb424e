//! Wire types for the checkout verification endpoint.

use std::str::FromStr;

use quickcart_core::{Address, AddressFields, ProductId, VariationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartSnapshot};

// =============================================================================
// Request Types
// =============================================================================

/// A cart line in the format the verification endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedProduct {
    pub product_id: ProductId,
    /// Omitted entirely for products without variations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_option_id: Option<VariationId>,
    pub order_quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl From<&CartItem> for OrderedProduct {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            variation_option_id: item.variation_id,
            order_quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.item_total(),
        }
    }
}

/// Body of `POST orders/checkout/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutVerificationInput {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub products: Vec<OrderedProduct>,
    pub billing_address: AddressFields,
    pub shipping_address: AddressFields,
}

impl CheckoutVerificationInput {
    /// Build the request body from the cart and both addresses.
    ///
    /// Addresses without inner fields are sent as empty objects.
    #[must_use]
    pub fn from_checkout(cart: &CartSnapshot, billing: &Address, shipping: &Address) -> Self {
        Self {
            amount: cart.total,
            products: cart.items.iter().map(OrderedProduct::from).collect(),
            billing_address: billing.fields_or_empty(),
            shipping_address: shipping.fields_or_empty(),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Successful verification payload.
///
/// The payload is passed through untouched. The accessors read the fields the
/// order summary needs without constraining the rest of the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifiedResponse(serde_json::Value);

impl VerifiedResponse {
    /// Wrap a raw payload.
    #[must_use]
    pub const fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    /// The raw payload.
    #[must_use]
    pub const fn payload(&self) -> &serde_json::Value {
        &self.0
    }

    /// Tax for the whole order.
    #[must_use]
    pub fn total_tax(&self) -> Option<Decimal> {
        self.decimal_field("total_tax")
    }

    /// Shipping charge for the whole order.
    #[must_use]
    pub fn shipping_charge(&self) -> Option<Decimal> {
        self.decimal_field("shipping_charge")
    }

    /// Products that cannot be delivered to the shipping address.
    ///
    /// Entries may be bare ids or product objects with an `id` field.
    #[must_use]
    pub fn unavailable_products(&self) -> Vec<ProductId> {
        self.0
            .get("unavailable_products")
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("id").unwrap_or(entry).as_i64())
                    .map(ProductId::new)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Amounts arrive as JSON numbers or as decimal strings.
    fn decimal_field(&self, key: &str) -> Option<Decimal> {
        match self.0.get(key)? {
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok(),
            serde_json::Value::String(s) => Decimal::from_str(s).ok(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for VerifiedResponse {
    fn from(payload: serde_json::Value) -> Self {
        Self(payload)
    }
}
