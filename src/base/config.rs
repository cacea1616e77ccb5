//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default port the webhook server binds to.
fn default_port() -> u16 {
    8080
}

/// Default base URL of the chat platform's REST API.
fn default_chat_api_base() -> String {
    "https://chat.googleapis.com/v1".to_string()
}

/// Default metadata-server endpoint for service-account tokens.
fn default_metadata_token_url() -> String {
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token".to_string()
}

/// Default user mention prefixed to irc relay envelopes (the bridge bot's handle).
fn default_irc_bridge_user() -> String {
    "UQBA90P1R".to_string()
}

/// Default group mention prefixed to slack relay envelopes.
fn default_slack_notify_group() -> String {
    "sre-ic".to_string()
}

/// Configuration for the relay-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The shared inner configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The configuration values, named after their environment variables.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Port the webhook server listens on (`RELAY_BOT_PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the chat platform REST API (`RELAY_BOT_CHAT_API_BASE`).
    #[serde(default = "default_chat_api_base")]
    pub chat_api_base: String,
    /// Token endpoint credentials are obtained from at startup (`RELAY_BOT_METADATA_TOKEN_URL`).
    #[serde(default = "default_metadata_token_url")]
    pub metadata_token_url: String,
    /// Webhook URL messages directed at irc are forwarded to (`RELAY_BOT_IRC_WEBHOOK_URL`).
    pub irc_webhook_url: String,
    /// Webhook URL messages directed at slack are forwarded to (`RELAY_BOT_SLACK_WEBHOOK_URL`).
    pub slack_webhook_url: String,
    /// User mentioned in irc relay envelopes (`RELAY_BOT_IRC_BRIDGE_USER`).
    #[serde(default = "default_irc_bridge_user")]
    pub irc_bridge_user: String,
    /// Group mentioned in slack relay envelopes (`RELAY_BOT_SLACK_NOTIFY_GROUP`).
    #[serde(default = "default_slack_notify_group")]
    pub slack_notify_group: String,
}

impl Config {
    /// Load the configuration from the environment and an optional config file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("RELAY_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.port == 0 {
            return Err(anyhow::anyhow!("Port must be non-zero."));
        }

        for (name, url) in [("irc", &result.irc_webhook_url), ("slack", &result.slack_webhook_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("The {} webhook URL must be an http(s) URL.", name));
            }
        }

        Ok(result)
    }
}
