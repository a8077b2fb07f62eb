//! Event handling and user interactions for relay-bot.
//!
//! This module provides functionality for handling inbound messages:
//! - Wrapping guild and group events behind one message type
//! - Replying with the right protocol for each channel kind
//! - Picking canned replies by keyword

pub mod handler;
pub mod keyword;
pub mod message;
