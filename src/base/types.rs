//! Common types and result aliases used throughout the application.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error type used throughout the application.
pub type Err = anyhow::Error;
/// Result type used throughout the application.
pub type Res<T> = Result<T, Err>;
/// Result type for operations that only produce side effects.
pub type Void = Res<()>;

/// Kind of event delivered by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// The bot was added to a space.
    AddedToSpace,
    /// The bot was removed from a space.
    RemovedFromSpace,
    /// A user sent a message in a space the bot is in.
    Message,
    /// Any event kind this bot does not handle.
    #[serde(other)]
    Unknown,
}

/// Kind of conversation container an event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceType {
    /// A multi-user room.
    Room,
    /// A direct message with a single user.
    Dm,
    /// Any space kind this bot does not distinguish.
    #[serde(other)]
    #[default]
    Unknown,
}

/// A conversation container (room or direct message).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    /// Resource name of the space, e.g. `spaces/AAAA1234`.
    #[serde(default)]
    pub name: String,
    /// Kind of the space.
    #[serde(rename = "type", default)]
    pub space_type: SpaceType,
    /// Human-readable name. Absent for direct messages.
    #[serde(default)]
    pub display_name: String,
}

/// A chat platform user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Human-readable name of the user.
    #[serde(default)]
    pub display_name: String,
}

/// The message attached to a `MESSAGE` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Raw text of the message.
    #[serde(default)]
    pub text: String,
    /// The user who sent the message.
    #[serde(default)]
    pub sender: User,
    /// Opaque thread reference, echoed back unmodified so the reply stays in
    /// the thread that raised the event.
    #[serde(default)]
    pub thread: Option<Value>,
}

/// An event callback delivered by the chat platform webhook.
///
/// `message` is present iff the event type is `MESSAGE`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Kind of the event.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The space the event originated from.
    #[serde(default)]
    pub space: Space,
    /// The user the event concerns.
    #[serde(default)]
    pub user: User,
    /// The message that raised the event, for `MESSAGE` events.
    #[serde(default)]
    pub message: Option<Message>,
}

/// Reply posted back to the originating space via the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Text of the reply.
    pub text: String,
    /// Thread reference echoed from the originating event, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Value>,
}

/// External messaging backend a user message can be relayed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayChannel {
    /// The irc bridge.
    Irc,
    /// Slack.
    Slack,
}

impl std::fmt::Display for RelayChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RelayChannel::Irc => "irc",
            RelayChannel::Slack => "slack",
        })
    }
}

/// Result of a single relay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Whether the message carried a recognizable channel directive.
    pub matched: bool,
    /// Whether the downstream webhook accepted the envelope.
    pub delivered: bool,
    /// The channel the directive named, when one matched.
    pub channel: Option<RelayChannel>,
}

impl RelayOutcome {
    /// Outcome for a message without a channel directive; no network call was made.
    pub fn no_match() -> Self {
        Self { matched: false, delivered: false, channel: None }
    }
}
