//! Relay dispatch: recognize a channel directive in a user message and forward the rest.

use tracing::{instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{RelayChannel, RelayOutcome},
    },
    service::relay::RelayClient,
};

/// Parse the channel directive from a message.
///
/// The final whitespace token of the first line is matched case-insensitively
/// against the known channel keywords, so `"ping irc\nhello"` and `"SLACK\nhi"`
/// both carry directives while `"hello\nworld"` does not. Returns the channel
/// and the remaining lines joined with single spaces.
pub fn parse_directive(message: &str) -> Option<(RelayChannel, String)> {
    let mut lines = message.lines();
    let first = lines.next()?;

    let channel = match first.split_whitespace().last()?.to_ascii_lowercase().as_str() {
        "irc" => RelayChannel::Irc,
        "slack" => RelayChannel::Slack,
        _ => return None,
    };

    Some((channel, lines.collect::<Vec<_>>().join(" ")))
}

/// Forward a user message to the channel it directs, if any.
///
/// Messages without a directive are reported as unmatched without any network
/// call. Delivery failures of any kind are reported uniformly through
/// `delivered`; there are no retries.
#[instrument(skip_all)]
pub async fn dispatch(message: &str, sender: &str, relay: &RelayClient, config: &Config) -> RelayOutcome {
    let Some((channel, forwarded)) = parse_directive(message) else {
        return RelayOutcome::no_match();
    };

    let envelope = match channel {
        RelayChannel::Irc => format!("<@{}> irc\n{} said: {}", config.irc_bridge_user, sender, forwarded),
        RelayChannel::Slack => format!("@{} {} said: {}", config.slack_notify_group, sender, forwarded),
    };

    let delivered = match relay.forward(channel, &envelope).await {
        Ok(delivered) => delivered,
        Err(err) => {
            warn!("Relay to {} failed: {}", channel, err);
            false
        }
    };

    RelayOutcome {
        matched: true,
        delivered,
        channel: Some(channel),
    }
}
