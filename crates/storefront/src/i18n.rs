//! Message catalog for customer-facing text.
//!
//! Workflows only produce message keys; this catalog turns them into display
//! strings. Catalogs are flat JSON objects, one per namespace, in the same
//! shape as the storefront's `common.json` locale files.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

/// Message keys emitted by this crate.
pub mod keys {
    pub const ERROR_ADD_BOTH_ADDRESS: &str = "error-add-both-address";
    pub const TEXT_CALCULATED_CHECKOUT: &str = "text-calculated-checkout";
    pub const TEXT_SUB_TOTAL: &str = "text-sub-total";
    pub const TEXT_TAX: &str = "text-tax";
    pub const TEXT_SHIPPING: &str = "text-shipping";
    pub const TEXT_TOTAL: &str = "text-total";
    pub const TEXT_UNAVAILABLE: &str = "text-unavailable";
    pub const TEXT_LOADING: &str = "text-loading";
}

/// Errors that can occur when loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is not a flat JSON object of strings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Key to display string mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// English defaults for every key in [`keys`].
    #[must_use]
    pub fn english() -> Self {
        let messages = [
            (keys::ERROR_ADD_BOTH_ADDRESS, "Please add both billing and shipping address"),
            (keys::TEXT_CALCULATED_CHECKOUT, "Calculated at checkout"),
            (keys::TEXT_SUB_TOTAL, "Sub total"),
            (keys::TEXT_TAX, "Tax"),
            (keys::TEXT_SHIPPING, "Shipping"),
            (keys::TEXT_TOTAL, "Total"),
            (keys::TEXT_UNAVAILABLE, "Unavailable"),
            (keys::TEXT_LOADING, "Loading..."),
        ]
        .into_iter()
        .map(|(key, text)| (key.to_string(), text.to_string()))
        .collect();

        Self { messages }
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the text is not a JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            messages: serde_json::from_str(json)?,
        })
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Layer `other` on top of this catalog. Keys in `other` win.
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.messages.extend(other.messages);
        self
    }

    /// Display string for `key`, or the key itself when it is unknown.
    #[must_use]
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map_or(key, String::as_str)
    }
}
