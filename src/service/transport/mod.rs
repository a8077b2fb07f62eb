pub mod qq;

use std::{ops::Deref, path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{MediaHandle, MediaType, MsgType, Res, Void};

// Requests.

/// A text message to a guild channel, optionally carrying one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTextRequest {
    pub channel_id: String,
    /// Id of the message being replied to.
    pub msg_id: String,
    pub content: String,
    /// Local image file, uploaded together with the message.
    pub file_image: Option<PathBuf>,
    /// Remote image, attached by reference.
    pub image_url: Option<String>,
}

/// A media object to register with a group before it can be sent.
///
/// Exactly one of `file_data` (base64) and `url` is expected to be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMediaRequest {
    pub group_openid: String,
    pub file_type: MediaType,
    pub file_data: Option<String>,
    pub url: Option<String>,
}

/// A message to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMessageRequest {
    pub group_openid: String,
    pub msg_type: MsgType,
    /// Id of the message being replied to.
    pub msg_id: String,
    pub content: String,
    pub media: Option<MediaHandle>,
    /// Per-message reply sequence; the platform rejects repeats.
    pub msg_seq: u32,
}

// Traits.

/// Generic outbound transport that platform clients must implement.
///
/// This trait is the only way the message facade talks to the outside world,
/// which keeps the reply protocol testable against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenericTransport: Send + Sync + 'static {
    /// Send a text message to a guild channel.
    async fn send_channel_text(&self, request: ChannelTextRequest) -> Void;

    /// Upload a media object to a group and return its handle.
    async fn upload_group_media(&self, request: GroupMediaRequest) -> Res<MediaHandle>;

    /// Send a message to a group.
    async fn send_group_message(&self, request: GroupMessageRequest) -> Void;
}

// Structs.

/// Transport for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<dyn GenericTransport>,
}

impl Deref for Transport {
    type Target = dyn GenericTransport;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl Transport {
    pub fn new(inner: Arc<dyn GenericTransport>) -> Self {
        Self { inner }
    }
}
