//! Runtime services and shared state for the relay-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    server,
    service::{chat::ChatClient, relay::RelayClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and the outbound clients. It is
/// designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat platform client instance.
    pub chat: ChatClient,
    /// The relay webhook client instance.
    pub relay: RelayClient,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Failing to obtain chat credentials is fatal here; the process never
    /// serves traffic without them.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the chat client, which acquires credentials at startup.
        let chat = ChatClient::google(&config).await?;

        // Initialize the relay webhook client.
        let relay = RelayClient::webhook(&config);

        Ok(Self { config, chat, relay })
    }

    pub async fn start(&self) -> Void {
        server::serve(self.clone()).await
    }
}
