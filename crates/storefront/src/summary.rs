//! Order summary shown next to the checkout.
//!
//! Before the shop has verified the checkout, tax and shipping are not known
//! and display as "calculated at checkout". Once a verified response is
//! available the summary carries real figures and flags lines the shop
//! cannot deliver.

use quickcart_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;

use crate::api::VerifiedResponse;
use crate::cart::{CartItem, CartSnapshot};
use crate::i18n::{Catalog, keys};

/// A figure in the summary: either an amount or a message key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryValue {
    Amount(Price),
    Pending(&'static str),
}

impl SummaryValue {
    /// Display text, translating message keys through `catalog`.
    #[must_use]
    pub fn render(&self, catalog: &Catalog) -> String {
        match self {
            Self::Amount(price) => price.display(),
            Self::Pending(key) => catalog.translate(key).to_string(),
        }
    }
}

/// One cart line in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub line_total: Price,
    /// Set when the verified response lists the product as unavailable.
    pub unavailable: bool,
}

/// Order summary for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: Price,
    pub tax: SummaryValue,
    pub shipping: SummaryValue,
    pub total: SummaryValue,
}

impl OrderSummary {
    /// Build a summary from the cart and the latest verification, if any.
    #[must_use]
    pub fn build(
        cart: &CartSnapshot,
        verified: Option<&VerifiedResponse>,
        currency: CurrencyCode,
    ) -> Self {
        let unavailable = verified
            .map(VerifiedResponse::unavailable_products)
            .unwrap_or_default();
        let lines = cart
            .items
            .iter()
            .map(|item| SummaryLine::new(item, currency, unavailable.contains(&item.product_id)))
            .collect();
        let subtotal = Price::new(cart.total, currency);

        let Some(verified) = verified else {
            return Self {
                lines,
                subtotal,
                tax: SummaryValue::Pending(keys::TEXT_CALCULATED_CHECKOUT),
                shipping: SummaryValue::Pending(keys::TEXT_CALCULATED_CHECKOUT),
                total: SummaryValue::Amount(subtotal),
            };
        };

        let tax = verified.total_tax().unwrap_or(Decimal::ZERO);
        let shipping = verified.shipping_charge().unwrap_or(Decimal::ZERO);

        Self {
            lines,
            subtotal,
            tax: SummaryValue::Amount(Price::new(tax, currency)),
            shipping: SummaryValue::Amount(Price::new(shipping, currency)),
            total: SummaryValue::Amount(Price::new(cart.total + tax + shipping, currency)),
        }
    }

    /// Whether any line cannot be delivered.
    #[must_use]
    pub fn has_unavailable_items(&self) -> bool {
        self.lines.iter().any(|line| line.unavailable)
    }

    /// Label/value rows in display order.
    #[must_use]
    pub fn rows(&self, catalog: &Catalog) -> Vec<(String, String)> {
        vec![
            (
                catalog.translate(keys::TEXT_SUB_TOTAL).to_string(),
                self.subtotal.display(),
            ),
            (
                catalog.translate(keys::TEXT_TAX).to_string(),
                self.tax.render(catalog),
            ),
            (
                catalog.translate(keys::TEXT_SHIPPING).to_string(),
                self.shipping.render(catalog),
            ),
            (
                catalog.translate(keys::TEXT_TOTAL).to_string(),
                self.total.render(catalog),
            ),
        ]
    }
}

impl SummaryLine {
    fn new(item: &CartItem, currency: CurrencyCode, unavailable: bool) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            quantity: item.quantity,
            line_total: Price::new(item.item_total(), currency),
            unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cart() -> CartSnapshot {
        CartSnapshot::from_items(vec![
            CartItem {
                id: "1".to_string(),
                product_id: ProductId::new(1),
                variation_id: None,
                name: "Pineapple".to_string(),
                unit_price: Decimal::from(100),
                quantity: 1,
            },
            CartItem {
                id: "2".to_string(),
                product_id: ProductId::new(2),
                variation_id: None,
                name: "Mango".to_string(),
                unit_price: Decimal::from(200),
                quantity: 2,
            },
        ])
    }

    #[test]
    fn test_unverified_summary_defers_tax_and_shipping() {
        let summary = OrderSummary::build(&cart(), None, CurrencyCode::USD);

        assert_eq!(summary.subtotal.display(), "$500.00");
        assert_eq!(
            summary.tax,
            SummaryValue::Pending(keys::TEXT_CALCULATED_CHECKOUT)
        );
        assert!(!summary.has_unavailable_items());

        let rows = summary.rows(&Catalog::english());
        assert_eq!(rows[1], ("Tax".to_string(), "Calculated at checkout".to_string()));
    }

    #[test]
    fn test_verified_summary_adds_tax_and_shipping() {
        let verified = VerifiedResponse::new(json!({
            "total_tax": 25,
            "shipping_charge": "10.50",
            "unavailable_products": [2]
        }));
        let summary = OrderSummary::build(&cart(), Some(&verified), CurrencyCode::USD);

        assert_eq!(summary.tax.render(&Catalog::english()), "$25.00");
        assert_eq!(summary.shipping.render(&Catalog::english()), "$10.50");
        assert_eq!(summary.total.render(&Catalog::english()), "$535.50");
        assert!(summary.has_unavailable_items());
        assert!(!summary.lines[0].unavailable);
        assert!(summary.lines[1].unavailable);
        assert_eq!(summary.lines[1].line_total.display(), "$400.00");
    }

    #[test]
    fn test_verified_summary_without_figures_counts_zero() {
        let verified = VerifiedResponse::new(json!({}));
        let summary = OrderSummary::build(&cart(), Some(&verified), CurrencyCode::EUR);

        assert_eq!(summary.total.render(&Catalog::english()), "€500.00");
    }
}
