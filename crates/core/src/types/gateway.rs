//! Payment gateway availability.
//!
//! A shop configures a default gateway plus a list of enabled gateways. A
//! gateway is available when it is either of those. Names are compared
//! case-insensitively.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Payment gateways known to the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentGateway {
    Stripe,
    Paypal,
    Razorpay,
    Mollie,
    Paystack,
    CashOnDelivery,
    Cash,
    FullWalletPayment,
}

impl PaymentGateway {
    /// Canonical (upper-case) identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stripe => "STRIPE",
            Self::Paypal => "PAYPAL",
            Self::Razorpay => "RAZORPAY",
            Self::Mollie => "MOLLIE",
            Self::Paystack => "PAYSTACK",
            Self::CashOnDelivery => "CASH_ON_DELIVERY",
            Self::Cash => "CASH",
            Self::FullWalletPayment => "FULL_WALLET_PAYMENT",
        }
    }
}

impl fmt::Display for PaymentGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentGateway {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STRIPE" => Ok(Self::Stripe),
            "PAYPAL" => Ok(Self::Paypal),
            "RAZORPAY" => Ok(Self::Razorpay),
            "MOLLIE" => Ok(Self::Mollie),
            "PAYSTACK" => Ok(Self::Paystack),
            "CASH_ON_DELIVERY" => Ok(Self::CashOnDelivery),
            "CASH" => Ok(Self::Cash),
            "FULL_WALLET_PAYMENT" => Ok(Self::FullWalletPayment),
            _ => Err(format!("unknown payment gateway: {s}")),
        }
    }
}

/// One configured gateway in the shop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GatewayEntry {
    /// Create an entry with just a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
        }
    }
}

/// The payment section of the shop settings.
///
/// Both fields may be missing in settings served by older API versions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySettings {
    #[serde(default)]
    pub default_payment_gateway: Option<String>,
    #[serde(default)]
    pub payment_gateway: Option<Vec<GatewayEntry>>,
}

/// Whether `target` is enabled, either as the default gateway or among the
/// configured ones.
///
/// Returns `false` when either settings field is missing. An empty default
/// name counts as missing.
#[must_use]
pub fn is_gateway_available(settings: &GatewaySettings, target: &str) -> bool {
    let (Some(default_gateway), Some(gateways)) = (
        settings
            .default_payment_gateway
            .as_deref()
            .filter(|name| !name.is_empty()),
        settings.payment_gateway.as_deref(),
    ) else {
        return false;
    };

    let target = target.to_uppercase();

    default_gateway.to_uppercase() == target
        || gateways
            .iter()
            .any(|gateway| gateway.name.to_uppercase() == target)
}

/// Whether Stripe is enabled for checkout.
#[must_use]
pub fn is_stripe_available(settings: &GatewaySettings) -> bool {
    is_gateway_available(settings, PaymentGateway::Stripe.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings(default: Option<&str>, gateways: Option<&[&str]>) -> GatewaySettings {
        GatewaySettings {
            default_payment_gateway: default.map(String::from),
            payment_gateway: gateways
                .map(|names| names.iter().map(|name| GatewayEntry::named(*name)).collect()),
        }
    }

    #[test]
    fn test_missing_fields_are_unavailable() {
        assert!(!is_stripe_available(&GatewaySettings::default()));
        assert!(!is_stripe_available(&settings(Some("STRIPE"), None)));
        assert!(!is_stripe_available(&settings(None, Some(&["stripe"]))));
    }

    #[test]
    fn test_empty_default_counts_as_missing() {
        assert!(!is_stripe_available(&settings(Some(""), Some(&["stripe"]))));
    }

    #[test]
    fn test_default_gateway_is_case_insensitive() {
        let lower = settings(Some("stripe"), Some(&[]));
        let upper = settings(Some("STRIPE"), Some(&[]));
        assert_eq!(is_stripe_available(&lower), is_stripe_available(&upper));
        assert!(is_stripe_available(&lower));
    }

    #[test]
    fn test_configured_gateway_matches() {
        let s = settings(Some("cash_on_delivery"), Some(&["PayPal", "Stripe"]));
        assert!(is_stripe_available(&s));
        assert!(is_gateway_available(&s, "paypal"));
        assert!(is_gateway_available(&s, "CASH_ON_DELIVERY"));
        assert!(!is_gateway_available(&s, "MOLLIE"));
    }

    #[test]
    fn test_not_available_anywhere() {
        let s = settings(Some("paypal"), Some(&["razorpay"]));
        assert!(!is_stripe_available(&s));
    }

    #[test]
    fn test_predicate_is_idempotent() {
        let s = settings(Some("mollie"), Some(&["stripe"]));
        assert_eq!(is_stripe_available(&s), is_stripe_available(&s));
    }

    #[test]
    fn test_settings_deserialize_from_camel_case() {
        let s: GatewaySettings = serde_json::from_value(serde_json::json!({
            "defaultPaymentGateway": "stripe",
            "paymentGateway": [{ "name": "stripe", "title": "Stripe" }]
        }))
        .unwrap();
        assert!(is_stripe_available(&s));

        let empty: GatewaySettings = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!is_stripe_available(&empty));
    }

    #[test]
    fn test_gateway_from_str_roundtrip() {
        let gateway: PaymentGateway = "cash_on_delivery".parse().unwrap();
        assert_eq!(gateway, PaymentGateway::CashOnDelivery);
        assert_eq!(gateway.to_string(), "CASH_ON_DELIVERY");
        assert!("bitcoin".parse::<PaymentGateway>().is_err());
    }
}
