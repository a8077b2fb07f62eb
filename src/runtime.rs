//! Runtime services and shared state for the relay-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{InboundEvent, Res, Void},
    },
    interaction::{
        handler,
        keyword::{KeywordMatcher, KeywordTable},
        message::ChannelMessage,
    },
    service::transport::Transport,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the outbound transport, and the
/// keyword matcher. It is designed to be trivially cloneable, allowing it to
/// be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The outbound transport instance.
    pub transport: Transport,
    /// The keyword matcher instance.
    pub matcher: KeywordMatcher,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the transport.
        let transport = Transport::qq(&config)?;

        // Initialize the keyword matcher.
        let matcher = KeywordMatcher::new(KeywordTable::from_config(&config)?);

        Ok(Self { config, transport, matcher })
    }

    /// Wrap an inbound event in a message bound to this runtime's transport.
    pub fn message(&self, event: InboundEvent) -> Res<ChannelMessage> {
        ChannelMessage::from_event(event, self.transport.clone())
    }

    /// Reply to an inbound event with the keyword matcher's answer.
    pub async fn respond(&self, event: InboundEvent) -> Void {
        handler::process_inbound_event(event, &self.transport, &self.matcher).await
    }

    /// Hand an inbound event off to its own task.
    pub fn dispatch(&self, event: InboundEvent) {
        handler::handle_inbound_event(event, self.transport.clone(), self.matcher.clone());
    }
}
