//! Event handling and user interactions for relay-bot.
//!
//! This module provides functionality for handling chat events:
//! - Classifying incoming events and building reply payloads
//! - Relaying user messages to the irc bridge or slack
//! - Coordinating the outbound reply to the originating space

pub mod chat_event;
pub mod relay;
