//! Wrapper around relay webhook clients.

use crate::base::{
    config::Config,
    types::{RelayChannel, Res},
};
use async_trait::async_trait;
use tracing::instrument;

use std::{ops::Deref, sync::Arc};

// Traits.

/// Generic "relay" trait that clients must implement.
#[async_trait]
pub trait GenericRelayClient {
    /// Deliver an envelope to the channel's webhook.
    ///
    /// Returns whether the webhook accepted it with a 200; transport-level
    /// errors bubble up and are folded into a failed delivery by the caller.
    async fn forward(&self, channel: RelayChannel, text: &str) -> Res<bool>;
}

// Structs.

/// Relay client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct RelayClient {
    inner: Arc<dyn GenericRelayClient + Send + Sync + 'static>,
}

impl Deref for RelayClient {
    type Target = dyn GenericRelayClient + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl RelayClient {
    /// Wrap an arbitrary relay client implementation.
    pub fn new(inner: Arc<dyn GenericRelayClient + Send + Sync + 'static>) -> Self {
        Self { inner }
    }

    /// Creates a webhook-backed relay client with the configured per-channel URLs.
    pub fn webhook(config: &Config) -> Self {
        Self {
            inner: Arc::new(WebhookRelayClient::new(config)),
        }
    }
}

// Specific implementations.

/// Webhook relay client implementation.
///
/// Each channel forwards to its own configured URL; the envelope format is
/// decided upstream, this client only delivers it.
#[derive(Clone)]
struct WebhookRelayClient {
    http: reqwest::Client,
    irc_url: String,
    slack_url: String,
}

impl WebhookRelayClient {
    /// Create a new webhook relay client.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            irc_url: config.irc_webhook_url.clone(),
            slack_url: config.slack_webhook_url.clone(),
        }
    }
}

#[async_trait]
impl GenericRelayClient for WebhookRelayClient {
    #[instrument(skip(self, text))]
    async fn forward(&self, channel: RelayChannel, text: &str) -> Res<bool> {
        let url = match channel {
            RelayChannel::Irc => &self.irc_url,
            RelayChannel::Slack => &self.slack_url,
        };

        let response = self.http.post(url).json(&serde_json::json!({ "text": text })).send().await?;

        Ok(response.status() == reqwest::StatusCode::OK)
    }
}
