//! Library root for `relay-bot`.
//!
//! Relay-bot is a QQ bot adapter that lets one piece of application logic talk
//! to both of the platform's messaging surfaces:
//! - Guild channels, addressed by channel id, with persistent author ids
//! - Groups, addressed by openid, with sequenced replies and uploaded media
//!
//! Both are wrapped by [`interaction::message::ChannelMessage`], which exposes
//! the same accessors and the same `reply` everywhere. Canned replies come
//! from an ordered keyword table ([`interaction::keyword::KeywordMatcher`]).
//! The outbound transport is a trait, with a QQ OpenAPI implementation.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use std::path::PathBuf;

use base::{
    config::Config,
    types::{InboundEvent, Void},
};
use rustls::crypto;
use tracing::{info, warn};

/// What to send back when replaying an event.
#[derive(Debug, Clone, Default)]
pub struct ReplyOptions {
    /// Explicit reply text. The keyword matcher answers when this is `None`.
    pub text: Option<String>,
    pub image_path: Option<PathBuf>,
    pub image_url: Option<String>,
}

/// Public async entry for the binary crate.
///
/// Replies once to a single inbound event:
/// - Initializes the crypto provider
/// - Creates the runtime context with the transport and keyword matcher
/// - Wraps the event and sends the reply
pub async fn replay(config: Config, event: InboundEvent, options: ReplyOptions) -> Void {
    info!("Starting relay-bot ...");

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Wrap the event.
    let mut message = runtime.message(event)?;

    let text = match options.text {
        Some(text) => text,
        None => runtime.matcher.match_content(message.content()).to_string(),
    };

    // Send the reply.
    message.reply(&text, options.image_path.as_deref(), options.image_url.as_deref()).await?;

    info!("Replied to {} (seq {}).", message.author_id(), message.reply_seq());

    Ok(())
}
