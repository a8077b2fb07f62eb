//! Inbound event handling: wrap the event, pick a reply, send it.

use tracing::{Instrument, error, info, instrument};

use crate::{
    base::types::{InboundEvent, Void},
    service::transport::Transport,
};

use super::{keyword::KeywordMatcher, message::ChannelMessage};

/// Handles an inbound event on its own task.
///
/// Errors have no caller to go back to here, so they are logged.
#[instrument(skip_all, fields(kind = ?event.kind()))]
pub fn handle_inbound_event(event: InboundEvent, transport: Transport, matcher: KeywordMatcher) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_inbound_event(event, &transport, &matcher).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Reply to an inbound event with the keyword matcher's answer.
#[instrument(skip_all)]
pub async fn process_inbound_event(event: InboundEvent, transport: &Transport, matcher: &KeywordMatcher) -> Void {
    let mut message = ChannelMessage::from_event(event, transport.clone())?;

    let response = matcher.match_content(message.content()).to_string();

    info!("Replying to {} with `{}` ...", message.author_id(), response);

    message.reply_text(&response).await
}
