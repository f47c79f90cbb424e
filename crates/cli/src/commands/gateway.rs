//! Payment gateway availability command.
//!
//! Reads exported shop settings and reports whether a gateway can be offered
//! at checkout.

use std::path::Path;

use quickcart_core::{GatewaySettings, is_gateway_available};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during the gateway command.
#[derive(Debug, Error)]
pub enum GatewayCommandError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gateway {0} is not available")]
    Unavailable(String),
}

/// Check `gateway` against the settings in `settings_path`.
///
/// # Errors
///
/// Returns an error if the settings cannot be loaded or the gateway is not
/// available.
#[allow(clippy::print_stdout)]
pub fn run(settings_path: &Path, gateway: &str) -> Result<(), GatewayCommandError> {
    let settings: GatewaySettings = serde_json::from_str(&std::fs::read_to_string(settings_path)?)?;

    info!(
        default = settings.default_payment_gateway.as_deref().unwrap_or("<none>"),
        configured = settings.payment_gateway.as_ref().map_or(0, Vec::len),
        "Loaded payment settings"
    );

    if is_gateway_available(&settings, gateway) {
        println!("{} is available", gateway.to_uppercase());
        Ok(())
    } else {
        Err(GatewayCommandError::Unavailable(gateway.to_uppercase()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn settings_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_configured_gateway_is_available() {
        let file = settings_file(
            r#"{"defaultPaymentGateway":"paypal","paymentGateway":[{"name":"stripe"}]}"#,
        );
        assert!(run(file.path(), "Stripe").is_ok());
    }

    #[test]
    fn test_missing_list_is_unavailable() {
        let file = settings_file(r#"{"defaultPaymentGateway":"stripe"}"#);
        let err = run(file.path(), "stripe").unwrap_err();
        assert!(matches!(err, GatewayCommandError::Unavailable(ref name) if name == "STRIPE"));
    }

    #[test]
    fn test_malformed_settings_is_parse_error() {
        let file = settings_file("not json");
        assert!(matches!(
            run(file.path(), "stripe"),
            Err(GatewayCommandError::Parse(_))
        ));
    }
}
