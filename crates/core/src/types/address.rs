//! Mailing address types.
//!
//! The checkout workflow only cares whether an address is present. The inner
//! fields are forwarded to the verification API untouched.

use serde::{Deserialize, Serialize};

/// Whether an address is used for billing or shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Billing,
    Shipping,
}

/// Structured address fields.
///
/// Absent fields are omitted on the wire, so `AddressFields::default()`
/// serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
}

/// A saved customer address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Label shown in the address picker (e.g., "Home").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    /// The structured fields, if the customer filled them in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressFields>,
}

impl Address {
    /// Create an address of the given type with its fields.
    #[must_use]
    pub const fn new(address_type: AddressType, address: AddressFields) -> Self {
        Self {
            title: None,
            address_type,
            address: Some(address),
        }
    }

    /// The fields to send on the wire, or an empty set when there are none.
    #[must_use]
    pub fn fields_or_empty(&self) -> AddressFields {
        self.address.clone().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_serialize_as_empty_object() {
        let json = serde_json::to_value(AddressFields::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_fields_or_empty_without_inner_address() {
        let address = Address {
            title: Some("Office".to_string()),
            address_type: AddressType::Shipping,
            address: None,
        };
        assert_eq!(address.fields_or_empty(), AddressFields::default());
    }

    #[test]
    fn test_address_deserializes_type_field() {
        let address: Address = serde_json::from_value(serde_json::json!({
            "title": "Home",
            "type": "billing",
            "address": { "city": "Austin", "zip": "78701" }
        }))
        .unwrap();

        assert_eq!(address.address_type, AddressType::Billing);
        let fields = address.fields_or_empty();
        assert_eq!(fields.city.as_deref(), Some("Austin"));
        assert_eq!(fields.country, None);
    }
}
