//! Core components, types, and utilities for the relay-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The built-in keyword reply table.
//! - Inbound event shapes, wire codes, and result handling.

pub mod config;
pub mod error;
pub mod keywords;
pub mod types;
