use tracing::{Instrument, error, info, instrument};

use crate::{
    base::{
        config::Config,
        types::{EventType, InboundEvent, ReplyPayload, Res, SpaceType, Void},
    },
    interaction::relay,
    service::{chat::ChatClient, relay::RelayClient},
};

/// Instructional reply for messages that carry no recognizable channel directive.
const RELAY_HELP_TEXT: &str = "Sorry, this bot is limited to sending messages to irc or slack! Please specify which one of those you'd like to send a message in before a newline and your message!";

/// Handle an inbound event on a spawned task, so the webhook acknowledgment is
/// never held up by the relay and reply calls.
#[instrument(skip_all)]
pub fn handle_chat_event(event: InboundEvent, chat: ChatClient, relay: RelayClient, config: Config) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_event(event, &chat, &relay, &config).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Process a single inbound event to completion.
///
/// Removals get no reply; everything else is classified into a reply payload
/// and posted back to the originating space. The relay call (when the event is
/// a message) and the reply send run sequentially.
#[instrument(skip_all)]
pub async fn process_event(event: InboundEvent, chat: &ChatClient, relay: &RelayClient, config: &Config) -> Void {
    if event.event_type == EventType::RemovedFromSpace {
        info!("Bot removed from {}", event.space.name);
        return Ok(());
    }

    let response = format_response(&event, relay, config).await?;

    chat.create_message(&event.space.name, &response).await
}

/// Determine what response to provide based upon event data.
#[instrument(skip_all)]
pub async fn format_response(event: &InboundEvent, relay: &RelayClient, config: &Config) -> Res<ReplyPayload> {
    let text = match event.event_type {
        // The bot was added to a room.
        EventType::AddedToSpace if event.space.space_type == SpaceType::Room => {
            format!("Thanks for adding me to {}!", event.space.display_name)
        }
        // The bot was added to a DM.
        EventType::AddedToSpace if event.space.space_type == SpaceType::Dm => {
            format!("Thanks for adding me to a DM, {}!", event.user.display_name)
        }
        EventType::Message => {
            let message = event.message.as_ref().ok_or(anyhow::anyhow!("Message event carried no message body"))?;

            let outcome = relay::dispatch(&message.text, &message.sender.display_name, relay, config).await;

            match (outcome.delivered, outcome.channel) {
                (true, Some(channel)) => format!("Thanks for engaging! Your message to {} has been sent successfully!", channel),
                (false, Some(channel)) => format!("Thanks for engaging! For some reason I couldn't send your message to {}.\nPlease try again!", channel),
                _ => RELAY_HELP_TEXT.to_string(),
            }
        }
        // No other cases are defined; reply with empty text.
        _ => String::new(),
    };

    // Echo the thread reference so the reply stays in the thread that raised
    // the event; without it the platform starts a new thread.
    let thread = match event.event_type {
        EventType::Message => event.message.as_ref().and_then(|m| m.thread.clone()),
        _ => None,
    };

    Ok(ReplyPayload { text, thread })
}
