//! Service integrations for external APIs and clients.
//!
//! This module contains the outbound transport used by the relay-bot:
//! - A generic transport trait with the three operations replies need
//! - A QQ OpenAPI implementation over HTTPS
//!
//! The trait is the seam between the reply protocol and the network,
//! allowing for extensibility and easy testing.

pub mod transport;
