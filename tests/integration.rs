#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use relay_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{InboundEvent, RelayChannel, ReplyPayload, Res, Void},
    },
    interaction::{chat_event, relay},
    runtime::Runtime,
    server,
    service::{
        chat::{ChatClient, GenericChatClient},
        relay::{GenericRelayClient, RelayClient},
    },
};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn create_message(&self, space_name: &str, payload: &ReplyPayload) -> Void;
    }
}

// Mock relay client for testing.

mock! {
    pub Relay {}

    #[async_trait]
    impl GenericRelayClient for Relay {
        async fn forward(&self, channel: RelayChannel, text: &str) -> Res<bool>;
    }
}

// Helpers.

/// Test configuration with known mention handles and webhook URLs.
fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            irc_webhook_url: "https://hooks.example.com/irc".to_string(),
            slack_webhook_url: "https://hooks.example.com/slack".to_string(),
            irc_bridge_user: "UQBA90P1R".to_string(),
            slack_notify_group: "sre-ic".to_string(),
            ..Default::default()
        }),
    }
}

/// Build an inbound event from its wire-format JSON.
fn event(value: serde_json::Value) -> InboundEvent {
    serde_json::from_value(value).expect("Failed to parse test event")
}

fn message_event(text: &str, sender: &str) -> InboundEvent {
    event(serde_json::json!({
        "type": "MESSAGE",
        "space": { "name": "spaces/AAAA1234", "type": "ROOM", "displayName": "Ops" },
        "user": { "displayName": sender },
        "message": { "text": text, "sender": { "displayName": sender } },
    }))
}

/// A relay mock that must never be called.
fn untouched_relay() -> RelayClient {
    let mut mock = MockRelay::new();
    mock.expect_forward().times(0);
    RelayClient::new(Arc::new(mock))
}

// Classifier tests.

#[tokio::test]
async fn removed_from_space_sends_no_reply() {
    let config = test_config();

    let mut chat_mock = MockChat::new();
    chat_mock.expect_create_message().times(0);
    let chat = ChatClient::new(Arc::new(chat_mock));

    let removed = event(serde_json::json!({
        "type": "REMOVED_FROM_SPACE",
        "space": { "name": "spaces/AAAA1234", "type": "ROOM", "displayName": "Ops" },
        "user": { "displayName": "Alice" },
    }));

    chat_event::process_event(removed, &chat, &untouched_relay(), &config).await.expect("Processing should succeed");
}

#[tokio::test]
async fn added_to_room_greets_with_space_name() {
    let config = test_config();

    let added = event(serde_json::json!({
        "type": "ADDED_TO_SPACE",
        "space": { "name": "spaces/AAAA1234", "type": "ROOM", "displayName": "The War Room" },
        "user": { "displayName": "Alice" },
    }));

    let reply = chat_event::format_response(&added, &untouched_relay(), &config).await.unwrap();

    assert_eq!(reply.text, "Thanks for adding me to The War Room!");
    assert!(reply.thread.is_none());
}

#[tokio::test]
async fn added_to_dm_greets_with_user_name() {
    let config = test_config();

    // DM spaces carry no display name on the wire.
    let added = event(serde_json::json!({
        "type": "ADDED_TO_SPACE",
        "space": { "name": "spaces/BBBB5678", "type": "DM" },
        "user": { "displayName": "Alice" },
    }));

    let reply = chat_event::format_response(&added, &untouched_relay(), &config).await.unwrap();

    assert_eq!(reply.text, "Thanks for adding me to a DM, Alice!");
}

#[tokio::test]
async fn unknown_event_type_gets_empty_text() {
    let config = test_config();

    let unknown = event(serde_json::json!({
        "type": "CARD_CLICKED",
        "space": { "name": "spaces/AAAA1234", "type": "ROOM", "displayName": "Ops" },
        "user": { "displayName": "Alice" },
    }));

    let reply = chat_event::format_response(&unknown, &untouched_relay(), &config).await.unwrap();

    assert_eq!(reply.text, "");
}

#[tokio::test]
async fn message_without_directive_gets_help_text() {
    let config = test_config();

    let reply = chat_event::format_response(&message_event("hello\nworld", "Bob"), &untouched_relay(), &config).await.unwrap();

    assert!(reply.text.starts_with("Sorry, this bot is limited to sending messages to irc or slack!"));
}

#[tokio::test]
async fn irc_directive_forwards_remaining_lines() {
    let config = test_config();

    let mut relay_mock = MockRelay::new();
    relay_mock
        .expect_forward()
        .withf(|channel, text| *channel == RelayChannel::Irc && text == "<@UQBA90P1R> irc\nBob said: hello there")
        .times(1)
        .returning(|_, _| Ok(true));
    let relay = RelayClient::new(Arc::new(relay_mock));

    let reply = chat_event::format_response(&message_event("foo irc\nhello there", "Bob"), &relay, &config).await.unwrap();

    assert_eq!(reply.text, "Thanks for engaging! Your message to irc has been sent successfully!");
}

#[tokio::test]
async fn slack_directive_is_case_insensitive_and_joins_lines() {
    let config = test_config();

    let mut relay_mock = MockRelay::new();
    relay_mock
        .expect_forward()
        .withf(|channel, text| *channel == RelayChannel::Slack && text == "@sre-ic Bob said: line1 line2")
        .times(1)
        .returning(|_, _| Ok(true));
    let relay = RelayClient::new(Arc::new(relay_mock));

    let reply = chat_event::format_response(&message_event("foo SLACK\nline1\nline2", "Bob"), &relay, &config).await.unwrap();

    assert_eq!(reply.text, "Thanks for engaging! Your message to slack has been sent successfully!");
}

#[tokio::test]
async fn rejected_delivery_asks_for_retry() {
    let config = test_config();

    let mut relay_mock = MockRelay::new();
    relay_mock.expect_forward().returning(|_, _| Ok(false));
    let relay = RelayClient::new(Arc::new(relay_mock));

    let reply = chat_event::format_response(&message_event("ping irc\nare you there?", "Bob"), &relay, &config).await.unwrap();

    assert_eq!(reply.text, "Thanks for engaging! For some reason I couldn't send your message to irc.\nPlease try again!");
}

#[tokio::test]
async fn transport_error_is_reported_as_failed_delivery() {
    let config = test_config();

    let mut relay_mock = MockRelay::new();
    relay_mock.expect_forward().returning(|_, _| Err(anyhow::anyhow!("connection refused")));
    let relay = RelayClient::new(Arc::new(relay_mock));

    let reply = chat_event::format_response(&message_event("ping slack\nhi", "Bob"), &relay, &config).await.unwrap();

    assert!(reply.text.contains("couldn't send your message to slack"));
    assert!(reply.text.ends_with("Please try again!"));
}

#[tokio::test]
async fn thread_reference_is_echoed_unchanged() {
    let config = test_config();

    let mut relay_mock = MockRelay::new();
    relay_mock.expect_forward().returning(|_, _| Ok(true));
    let relay = RelayClient::new(Arc::new(relay_mock));

    let thread = serde_json::json!({ "name": "spaces/AAAA1234/threads/XYZ" });

    let mut threaded = message_event("foo irc\nhello", "Bob");
    threaded.message.as_mut().unwrap().thread = Some(thread.clone());

    let reply = chat_event::format_response(&threaded, &relay, &config).await.unwrap();
    assert_eq!(reply.thread, Some(thread));

    // Without a thread reference, the payload carries no thread field at all.
    let reply = chat_event::format_response(&message_event("foo irc\nhello", "Bob"), &relay, &config).await.unwrap();
    assert!(reply.thread.is_none());
    assert!(!serde_json::to_string(&reply).unwrap().contains("thread"));
}

#[tokio::test]
async fn classification_is_idempotent() {
    let config = test_config();

    let mut relay_mock = MockRelay::new();
    relay_mock.expect_forward().returning(|_, _| Ok(true));
    let relay = RelayClient::new(Arc::new(relay_mock));

    let event = message_event("foo irc\nhello there", "Bob");

    let first = chat_event::format_response(&event, &relay, &config).await.unwrap();
    let second = chat_event::format_response(&event, &relay, &config).await.unwrap();

    assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
}

// Configuration tests.

#[test]
fn config_deserializes_as_a_whole() {
    let config: Config = serde_json::from_value(serde_json::json!({
        "inner": {
            "irc_webhook_url": "https://hooks.example.com/irc",
            "slack_webhook_url": "https://hooks.example.com/slack",
        },
    }))
    .expect("Failed to deserialize config");

    assert_eq!(config.port, 8080);
    assert_eq!(config.irc_bridge_user, "UQBA90P1R");
    assert_eq!(config.irc_webhook_url, "https://hooks.example.com/irc");
}

// Dispatcher parsing tests.

#[test]
fn directive_parsing_matches_final_token_of_first_line() {
    assert_eq!(relay::parse_directive("hello\nworld"), None);
    assert_eq!(relay::parse_directive(""), None);
    assert_eq!(relay::parse_directive("foo irc\nhello there"), Some((RelayChannel::Irc, "hello there".to_string())));
    assert_eq!(relay::parse_directive("foo SLACK\nline1\nline2"), Some((RelayChannel::Slack, "line1 line2".to_string())));

    // A lone directive line still matches; there is just nothing to forward.
    assert_eq!(relay::parse_directive("ping irc"), Some((RelayChannel::Irc, String::new())));

    // The directive must be the final token of the first line.
    assert_eq!(relay::parse_directive("irc is great\nhello"), None);
}

#[tokio::test]
async fn message_event_replies_into_originating_space() {
    let config = test_config();

    let mut chat_mock = MockChat::new();
    chat_mock
        .expect_create_message()
        .withf(|space_name, payload| space_name == "spaces/AAAA1234" && payload.text.contains("sent successfully"))
        .times(1)
        .returning(|_, _| Ok(()));
    let chat = ChatClient::new(Arc::new(chat_mock));

    let mut relay_mock = MockRelay::new();
    relay_mock.expect_forward().returning(|_, _| Ok(true));
    let relay = RelayClient::new(Arc::new(relay_mock));

    chat_event::process_event(message_event("foo irc\nhello", "Bob"), &chat, &relay, &config).await.unwrap();
}

// Webhook server tests, against a live listener on a free port.

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Start the server with permissive mocks and return its base URL.
async fn start_test_server() -> String {
    let port = free_port();

    let config = Config {
        inner: Arc::new(ConfigInner {
            port,
            irc_webhook_url: "https://hooks.example.com/irc".to_string(),
            slack_webhook_url: "https://hooks.example.com/slack".to_string(),
            ..Default::default()
        }),
    };

    let mut chat_mock = MockChat::new();
    chat_mock.expect_create_message().returning(|_, _| Ok(()));

    let mut relay_mock = MockRelay::new();
    relay_mock.expect_forward().returning(|_, _| Ok(true));

    let runtime = Runtime {
        config,
        chat: ChatClient::new(Arc::new(chat_mock)),
        relay: RelayClient::new(Arc::new(relay_mock)),
    };

    tokio::spawn(async move {
        let _ = server::serve(runtime).await;
    });

    let url = format!("http://127.0.0.1:{}/", port);

    // Wait for the listener to come up.
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if client.get(&url).send().await.is_ok() {
            return url;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    panic!("Server did not come up on {}", url);
}

#[tokio::test]
async fn webhook_acks_every_post_with_empty_json() {
    let url = start_test_server().await;
    let client = reqwest::Client::new();

    // A well-formed message event.
    let response = client
        .post(&url)
        .json(&serde_json::json!({
            "type": "MESSAGE",
            "space": { "name": "spaces/AAAA1234", "type": "ROOM", "displayName": "Ops" },
            "user": { "displayName": "Bob" },
            "message": { "text": "foo irc\nhello", "sender": { "displayName": "Bob" } },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "{}");

    // A removal gets the same empty acknowledgment.
    let response = client
        .post(&url)
        .json(&serde_json::json!({
            "type": "REMOVED_FROM_SPACE",
            "space": { "name": "spaces/AAAA1234" },
            "user": { "displayName": "Bob" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "{}");

    // Malformed bodies are logged and still acknowledged.
    let response = client.post(&url).body("this is not json").send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "{}");
}

#[tokio::test]
async fn landing_page_is_served_on_get() {
    let url = start_test_server().await;

    let response = reqwest::get(&url).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("relay-bot"));
}
