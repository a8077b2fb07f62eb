//! A channel-agnostic view over one inbound message, and the reply protocol.
//!
//! Guild channels and groups address replies differently:
//! - Guild replies go to the originating channel, mention the author, and
//!   carry an image inline (local file or url) in a single call.
//! - Group replies carry a per-message sequence number, and images must be
//!   uploaded as a media object first, then referenced by the message.

use std::path::Path;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, instrument};

use crate::{
    base::{
        error::RelayError,
        types::{ChannelKind, GroupEvent, GuildEvent, InboundEvent, MediaHandle, MediaType, MsgType, Res, Void},
    },
    service::transport::{ChannelTextRequest, GroupMediaRequest, GroupMessageRequest, Transport},
};

/// How the image of a single reply travels, selected once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaPlan<'a> {
    NoMedia,
    LocalUpload(&'a Path),
    RemoteUpload(&'a str),
}

impl<'a> MediaPlan<'a> {
    fn select(image_path: Option<&'a Path>, image_url: Option<&'a str>) -> Res<Self> {
        match (image_path, image_url) {
            (None, None) => Ok(MediaPlan::NoMedia),
            (Some(path), None) => Ok(MediaPlan::LocalUpload(path)),
            (None, Some(url)) => Ok(MediaPlan::RemoteUpload(url)),
            (Some(_), Some(_)) => Err(RelayError::ConflictingImages.into()),
        }
    }
}

/// One inbound message, from either a guild channel or a group.
///
/// Lives for the handling of a single event. `reply` takes `&mut self`, so
/// replies on one message are always sequential.
pub struct ChannelMessage {
    event: InboundEvent,
    content: String,
    reply_seq: u32,
    transport: Transport,
}

impl ChannelMessage {
    /// Wrap an inbound guild channel message.
    pub fn from_guild_event(event: GuildEvent, transport: Transport) -> Res<Self> {
        require(&event.id, "id")?;
        require(&event.channel_id, "channel_id")?;
        require(&event.author.id, "author.id")?;

        Ok(Self {
            content: event.content.clone(),
            event: InboundEvent::Guild(event),
            reply_seq: 0,
            transport,
        })
    }

    /// Wrap an inbound group message.
    pub fn from_group_event(event: GroupEvent, transport: Transport) -> Res<Self> {
        require(&event.id, "id")?;
        require(&event.group_openid, "group_openid")?;
        require(&event.author.member_openid, "author.member_openid")?;

        Ok(Self {
            content: event.content.clone(),
            event: InboundEvent::Group(event),
            reply_seq: 0,
            transport,
        })
    }

    pub fn from_event(event: InboundEvent, transport: Transport) -> Res<Self> {
        match event {
            InboundEvent::Guild(event) => Self::from_guild_event(event, transport),
            InboundEvent::Group(event) => Self::from_group_event(event, transport),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.event.kind()
    }

    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    pub fn guild_event(&self) -> Option<&GuildEvent> {
        match &self.event {
            InboundEvent::Guild(event) => Some(event),
            InboundEvent::Group(_) => None,
        }
    }

    pub fn group_event(&self) -> Option<&GroupEvent> {
        match &self.event {
            InboundEvent::Group(event) => Some(event),
            InboundEvent::Guild(_) => None,
        }
    }

    /// Identifier of the author.
    ///
    /// For guild messages this is the persistent account id. For group
    /// messages it is the member openid, which is only stable inside that
    /// group. The two are never comparable.
    pub fn author_id(&self) -> &str {
        match &self.event {
            InboundEvent::Guild(event) => &event.author.id,
            InboundEvent::Group(event) => &event.author.member_openid,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of `reply` calls made so far, failed ones included.
    pub fn reply_seq(&self) -> u32 {
        self.reply_seq
    }

    /// Reply to this message, optionally with one image.
    ///
    /// The reply sequence advances before anything else, so every call counts
    /// whether or not it succeeds. Transport errors are returned as-is.
    #[instrument(skip(self, text), fields(kind = ?self.kind(), seq))]
    pub async fn reply(&mut self, text: &str, image_path: Option<&Path>, image_url: Option<&str>) -> Void {
        self.reply_seq += 1;
        tracing::Span::current().record("seq", self.reply_seq);

        let plan = MediaPlan::select(image_path, image_url)?;

        match &self.event {
            InboundEvent::Guild(event) => self.reply_guild(event, text, plan).await,
            InboundEvent::Group(event) => self.reply_group(event, text, plan).await,
        }
    }

    pub async fn reply_text(&mut self, text: &str) -> Void {
        self.reply(text, None, None).await
    }

    pub async fn reply_with_image_path(&mut self, text: &str, image_path: &Path) -> Void {
        self.reply(text, Some(image_path), None).await
    }

    pub async fn reply_with_image_url(&mut self, text: &str, image_url: &str) -> Void {
        self.reply(text, None, Some(image_url)).await
    }

    async fn reply_guild(&self, event: &GuildEvent, text: &str, plan: MediaPlan<'_>) -> Void {
        let (file_image, image_url) = match plan {
            MediaPlan::NoMedia => (None, None),
            MediaPlan::LocalUpload(path) => (Some(path.to_path_buf()), None),
            MediaPlan::RemoteUpload(url) => (None, Some(url.to_string())),
        };

        let request = ChannelTextRequest {
            channel_id: event.channel_id.clone(),
            msg_id: event.id.clone(),
            content: format!("<@{}>{}", event.author.id, text),
            file_image,
            image_url,
        };

        self.transport.send_channel_text(request).await
    }

    async fn reply_group(&self, event: &GroupEvent, text: &str, plan: MediaPlan<'_>) -> Void {
        let media = match plan {
            MediaPlan::NoMedia => None,
            MediaPlan::LocalUpload(path) => {
                let bytes = tokio::fs::read(path).await.with_context(|| format!("Failed to read image `{}`", path.display()))?;
                debug!("Uploading {} bytes of image data ...", bytes.len());

                Some(self.upload_image(event, Some(STANDARD.encode(bytes)), None).await?)
            }
            MediaPlan::RemoteUpload(url) => Some(self.upload_image(event, None, Some(url.to_string())).await?),
        };

        let msg_type = if media.is_some() { MsgType::Media } else { MsgType::Text };

        let request = GroupMessageRequest {
            group_openid: event.group_openid.clone(),
            msg_type,
            msg_id: event.id.clone(),
            content: text.to_string(),
            media,
            msg_seq: self.reply_seq,
        };

        self.transport.send_group_message(request).await
    }

    async fn upload_image(&self, event: &GroupEvent, file_data: Option<String>, url: Option<String>) -> Res<MediaHandle> {
        let request = GroupMediaRequest {
            group_openid: event.group_openid.clone(),
            file_type: MediaType::Image,
            file_data,
            url,
        };

        self.transport.upload_group_media(request).await
    }
}

fn require(value: &str, field: &'static str) -> Void {
    if value.is_empty() {
        return Err(RelayError::MissingField(field).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        base::types::{GroupAuthor, GuildAuthor},
        service::transport::MockGenericTransport,
    };

    use super::*;

    fn guild_event() -> GuildEvent {
        GuildEvent {
            id: "M1".to_string(),
            channel_id: "C1".to_string(),
            guild_id: "G0".to_string(),
            content: "hello guild".to_string(),
            author: GuildAuthor {
                id: "42".to_string(),
                username: "alice".to_string(),
                bot: false,
            },
        }
    }

    fn group_event() -> GroupEvent {
        GroupEvent {
            id: "M2".to_string(),
            group_openid: "G1".to_string(),
            content: " hello group".to_string(),
            author: GroupAuthor {
                member_openid: "OPENID".to_string(),
            },
        }
    }

    fn idle_transport() -> Transport {
        Transport::new(Arc::new(MockGenericTransport::new()))
    }

    #[test]
    fn test_guild_accessors() {
        let message = ChannelMessage::from_guild_event(guild_event(), idle_transport()).unwrap();

        assert_eq!(message.kind(), ChannelKind::Guild);
        assert_eq!(message.author_id(), "42");
        assert_eq!(message.content(), "hello guild");
        assert_eq!(message.reply_seq(), 0);
        assert!(message.guild_event().is_some());
        assert!(message.group_event().is_none());
    }

    #[test]
    fn test_group_accessors() {
        let message = ChannelMessage::from_group_event(group_event(), idle_transport()).unwrap();

        assert_eq!(message.kind(), ChannelKind::Group);
        assert_eq!(message.author_id(), "OPENID");
        assert_eq!(message.content(), " hello group");
        assert!(message.group_event().is_some());
        assert!(message.guild_event().is_none());
    }

    #[test]
    fn test_from_event_dispatches_on_variant() {
        let message = ChannelMessage::from_event(InboundEvent::Group(group_event()), idle_transport()).unwrap();

        assert_eq!(message.kind(), ChannelKind::Group);
        assert_eq!(message.event(), &InboundEvent::Group(group_event()));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let mut event = guild_event();
        event.author.id.clear();
        let err = ChannelMessage::from_guild_event(event, idle_transport()).err().unwrap();
        assert!(matches!(err.downcast_ref::<RelayError>(), Some(RelayError::MissingField("author.id"))));

        let mut event = group_event();
        event.group_openid.clear();
        let err = ChannelMessage::from_group_event(event, idle_transport()).err().unwrap();
        assert!(matches!(err.downcast_ref::<RelayError>(), Some(RelayError::MissingField("group_openid"))));
    }

    #[test]
    fn test_media_plan_selection() {
        let path = Path::new("a.png");

        assert_eq!(MediaPlan::select(None, None).unwrap(), MediaPlan::NoMedia);
        assert_eq!(MediaPlan::select(Some(path), None).unwrap(), MediaPlan::LocalUpload(path));
        assert_eq!(MediaPlan::select(None, Some("u")).unwrap(), MediaPlan::RemoteUpload("u"));
        assert!(MediaPlan::select(Some(path), Some("u")).is_err());
    }

    #[tokio::test]
    async fn test_conflicting_images_still_advance_sequence() {
        // No expectations: any transport call would panic.
        let mut message = ChannelMessage::from_group_event(group_event(), idle_transport()).unwrap();

        let err = message.reply("x", Some(Path::new("a.png")), Some("https://example.com/a.png")).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<RelayError>(), Some(RelayError::ConflictingImages)));
        assert_eq!(message.reply_seq(), 1);
    }

    #[tokio::test]
    async fn test_guild_reply_mentions_author() {
        let mut transport = MockGenericTransport::new();
        transport
            .expect_send_channel_text()
            .withf(|r| r.channel_id == "C1" && r.msg_id == "M1" && r.content == "<@42>pong" && r.file_image.is_none() && r.image_url.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let mut message = ChannelMessage::from_guild_event(guild_event(), Transport::new(Arc::new(transport))).unwrap();
        message.reply_text("pong").await.unwrap();

        assert_eq!(message.reply_seq(), 1);
    }

    #[tokio::test]
    async fn test_group_reply_with_missing_file_fails_before_upload() {
        let mut message = ChannelMessage::from_group_event(group_event(), idle_transport()).unwrap();

        let result = message.reply_with_image_path("x", Path::new("/definitely/not/here.png")).await;

        assert!(result.is_err());
        assert_eq!(message.reply_seq(), 1);
    }
}
