//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the external services used by the relay-bot:
//! - The chat platform's message-creation API (replies)
//! - Downstream relay webhooks (irc bridge, slack)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod relay;
