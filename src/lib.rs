//! Library root for `relay-bot`.
//!
//! Relay-bot is a Google Chat bot that bridges chat spaces to other messaging systems:
//! - Acknowledges every event callback from the platform with an empty body
//! - Greets spaces and DMs it is added to
//! - Relays user messages to an irc bridge or slack via webhooks
//! - Posts its replies back through the platform's REST API
//!
//! The bot integrates with Google Chat for events and replies, and with
//! per-channel webhooks for relaying. The architecture is built around
//! extensible traits that allow for different implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the relay-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with chat and relay clients
/// - Starts the webhook server
pub async fn start(config: Config) -> Void {
    info!("Starting relay-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
