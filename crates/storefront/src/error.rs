//! Verification errors with Sentry integration.
//!
//! Errors in the checkout workflow never propagate past the workflow itself:
//! they are reported here and then surfaced as message keys for display.

use thiserror::Error;

use crate::api::ApiError;
use crate::i18n::keys;

/// Why a checkout verification did not produce a result.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Billing or shipping address missing. No request was sent.
    #[error("both billing and shipping addresses are required")]
    MissingAddress,

    /// The shop API rejected the verification or could not be reached.
    #[error("remote verification failed: {0}")]
    Remote(#[from] ApiError),
}

impl VerificationError {
    /// Message key to show the customer.
    ///
    /// Remote failures use the message sent by the shop API as-is. When the
    /// API sent no message there is nothing to show.
    #[must_use]
    pub fn message_key(&self) -> Option<String> {
        match self {
            Self::MissingAddress => Some(keys::ERROR_ADD_BOTH_ADDRESS.to_string()),
            Self::Remote(err) => err.message().map(String::from),
        }
    }
}

/// Report a failed verification to Sentry and the log.
///
/// Missing addresses are a normal customer state and are only logged.
pub fn report_verification_failure(err: &VerificationError, activation: u64) {
    match err {
        VerificationError::MissingAddress => {
            tracing::info!(activation, "Checkout verification skipped: address missing");
        }
        VerificationError::Remote(_) => {
            let event_id = sentry::capture_error(err);
            tracing::warn!(
                activation,
                error = %err,
                sentry_event_id = %event_id,
                "Checkout verification failed"
            );
        }
    }
}

/// Add a breadcrumb for checkout actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Verification started", Some(&[("items", "2")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_address_key() {
        let err = VerificationError::MissingAddress;
        assert_eq!(err.message_key().as_deref(), Some("error-add-both-address"));
        assert_eq!(
            err.to_string(),
            "both billing and shipping addresses are required"
        );
    }

    #[test]
    fn test_remote_error_uses_api_message() {
        let err = VerificationError::from(ApiError::Rejected {
            status: 422,
            message: Some("error-address-not-serviceable".to_string()),
        });
        assert_eq!(
            err.message_key().as_deref(),
            Some("error-address-not-serviceable")
        );
    }

    #[test]
    fn test_remote_error_without_message_has_no_key() {
        let err = VerificationError::from(ApiError::Rejected {
            status: 502,
            message: None,
        });
        assert_eq!(err.message_key(), None);
    }
}
