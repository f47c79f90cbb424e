//! Quickcart CLI - Checkout verification and payment gateway tools.
//!
//! # Usage
//!
//! ```bash
//! # Verify a checkout against the shop API
//! quickcart verify --checkout checkout.json
//!
//! # Verify and render the summary with a locale catalog
//! quickcart verify --checkout checkout.json --catalog locales/de/common.json
//!
//! # Check whether Stripe is enabled in exported shop settings
//! quickcart gateway --settings settings.json
//!
//! # Check any other gateway
//! quickcart gateway --settings settings.json --gateway paypal
//! ```
//!
//! # Commands
//!
//! - `verify` - Run one checkout verification and print the order summary
//! - `gateway` - Report whether a payment gateway is available

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quickcart_storefront::config::CheckoutConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "quickcart")]
#[command(author, version, about = "Quickcart checkout tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a checkout with the shop API
    Verify {
        /// JSON file with `items`, `billing_address` and `shipping_address`
        #[arg(short, long)]
        checkout: PathBuf,

        /// Locale catalog (flat JSON) layered over the English defaults
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Check whether a payment gateway is enabled
    Gateway {
        /// JSON file with `defaultPaymentGateway` and `paymentGateway`
        #[arg(short, long)]
        settings: PathBuf,

        /// Gateway identifier (case-insensitive)
        #[arg(short, long, default_value = "STRIPE")]
        gateway: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CheckoutConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickcart_storefront=info,quickcart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // Dropped after the final error is logged
    let mut sentry_guard = None;

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Verify { checkout, catalog } => match CheckoutConfig::from_env() {
            Ok(config) => {
                // Sentry must be initialized before the tracing subscriber
                sentry_guard = init_sentry(&config);
                init_tracing();
                commands::verify::run(&config, &checkout, catalog.as_deref())
                    .await
                    .map_err(Into::into)
            }
            Err(e) => {
                init_tracing();
                Err(e.into())
            }
        },
        Commands::Gateway { settings, gateway } => {
            init_tracing();
            commands::gateway::run(&settings, &gateway).map_err(Into::into)
        }
    };

    let code = exit_code(result);
    drop(sentry_guard);
    code
}

/// Log a failed command and map the result to the process exit code.
fn exit_code(result: Result<(), Box<dyn std::error::Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_command_is_reported_to_sentry() {
        let subscriber = tracing_subscriber::registry()
            .with(sentry_tracing::layer().event_filter(sentry_event_filter));

        let events = sentry::test::with_captured_events(|| {
            tracing::subscriber::with_default(subscriber, || {
                assert_eq!(exit_code(Err("checkout file has no items".into())), ExitCode::FAILURE);
            });
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, sentry::Level::Error);
        assert_eq!(
            events[0].message.as_deref(),
            Some("Command failed: checkout file has no items")
        );
    }

    #[test]
    fn test_success_reports_nothing() {
        let events = sentry::test::with_captured_events(|| {
            assert_eq!(exit_code(Ok(())), ExitCode::SUCCESS);
        });
        assert!(events.is_empty());
    }
}
