//! Wrapper around chat platform clients.

use crate::base::{
    config::Config,
    types::{ReplyPayload, Res, Void},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

use std::{ops::Deref, sync::Arc};

/// The single OAuth scope the bot requests for the chat platform API.
const CHAT_BOT_SCOPE: &str = "https://www.googleapis.com/auth/chat.bot";

// Traits.

/// Generic "chat" trait that clients must implement.
#[async_trait]
pub trait GenericChatClient {
    /// Post a reply payload to the given space's message-creation endpoint.
    async fn create_message(&self, space_name: &str, payload: &ReplyPayload) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient + Send + Sync + 'static>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    /// Wrap an arbitrary chat client implementation.
    pub fn new(inner: Arc<dyn GenericChatClient + Send + Sync + 'static>) -> Self {
        Self { inner }
    }

    /// Creates a new Google Chat client, obtaining credentials at startup.
    pub async fn google(config: &Config) -> Res<Self> {
        let client = GoogleChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Access token issued by the metadata server.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google Chat client implementation.
#[derive(Clone)]
struct GoogleChatClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl GoogleChatClient {
    /// Create a new Google Chat client.
    ///
    /// Credentials are fetched once here and are read-only for the process
    /// lifetime; a failure aborts startup before the server binds.
    #[instrument(name = "GoogleChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::new();

        let token = http
            .get(&config.metadata_token_url)
            .header("Metadata-Flavor", "Google")
            .query(&[("scopes", CHAT_BOT_SCOPE)])
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to obtain chat credentials: {}", e))?;

        info!("Obtained chat credentials scoped to {}", CHAT_BOT_SCOPE);

        Ok(Self {
            http,
            api_base: config.chat_api_base.clone(),
            access_token: token.access_token,
        })
    }
}

#[async_trait]
impl GenericChatClient for GoogleChatClient {
    #[instrument(skip(self, payload))]
    async fn create_message(&self, space_name: &str, payload: &ReplyPayload) -> Void {
        let url = format!("{}/{}/messages", self.api_base, space_name);

        let _ = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("Failed to post reply: {}", e))?;

        Ok(())
    }
}
