use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Author of a guild channel message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildAuthor {
    /// Persistent account id of the author.
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// Inbound message from a guild text channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildEvent {
    /// Message id, referenced by replies.
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub content: String,
    pub author: GuildAuthor,
}

/// Author of a group message.
///
/// The `member_openid` is only meaningful inside the group it was observed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAuthor {
    pub member_openid: String,
}

/// Inbound message from a group (the "at" message dispatch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEvent {
    /// Message id, referenced by replies.
    pub id: String,
    pub group_openid: String,
    #[serde(default)]
    pub content: String,
    pub author: GroupAuthor,
}

/// Exactly one inbound event, from either channel kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Guild(GuildEvent),
    Group(GroupEvent),
}

impl InboundEvent {
    pub fn kind(&self) -> ChannelKind {
        match self {
            InboundEvent::Guild(_) => ChannelKind::Guild,
            InboundEvent::Group(_) => ChannelKind::Group,
        }
    }

    /// Parse an event of the given kind from JSON.
    ///
    /// Accepts either the bare event object or a full gateway dispatch
    /// (`{"op": 0, "t": ..., "d": {...}}`), in which case `d` is used.
    pub fn from_json(kind: ChannelKind, payload: &str) -> Res<Self> {
        let mut value: serde_json::Value = serde_json::from_str(payload)?;

        if let Some(data) = value.get_mut("d") {
            value = data.take();
        }

        let event = match kind {
            ChannelKind::Guild => InboundEvent::Guild(serde_json::from_value(value)?),
            ChannelKind::Group => InboundEvent::Group(serde_json::from_value(value)?),
        };

        Ok(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Guild,
    Group,
}

/// Group message types understood by the send endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    Text,
    Media,
}

impl MsgType {
    pub fn code(self) -> u8 {
        match self {
            MsgType::Text => 0,
            MsgType::Media => 7,
        }
    }
}

/// Media object types accepted by the group upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
}

impl MediaType {
    pub fn code(self) -> u8 {
        match self {
            MediaType::Image => 1,
        }
    }
}

/// Opaque handle returned by a group media upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    #[serde(default)]
    pub file_uuid: String,
    pub file_info: String,
    #[serde(default)]
    pub ttl: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guild_event_from_dispatch_payload() {
        let payload = serde_json::json!({
            "id": "08f3",
            "channel_id": "100",
            "guild_id": "200",
            "content": "hello",
            "author": { "id": "42", "username": "alice", "bot": false },
            "timestamp": "2024-01-01T00:00:00+08:00",
        });

        let event: GuildEvent = serde_json::from_value(payload).unwrap();

        assert_eq!(event.author.id, "42");
        assert_eq!(event.channel_id, "100");
        assert_eq!(event.content, "hello");
    }

    #[test]
    fn test_group_event_requires_author() {
        let payload = serde_json::json!({
            "id": "ROBOT1.0_abc",
            "group_openid": "G1",
            "content": " hi",
        });

        assert!(serde_json::from_value::<GroupEvent>(payload).is_err());
    }

    #[test]
    fn test_from_json_unwraps_dispatch() {
        let payload = r#"{
            "op": 0,
            "s": 5,
            "t": "GROUP_AT_MESSAGE_CREATE",
            "d": {
                "id": "ROBOT1.0_abc",
                "group_openid": "G1",
                "content": " 你是谁",
                "author": { "member_openid": "OPENID" }
            }
        }"#;

        let event = InboundEvent::from_json(ChannelKind::Group, payload).unwrap();

        let InboundEvent::Group(event) = event else { panic!("expected a group event") };
        assert_eq!(event.author.member_openid, "OPENID");
        assert_eq!(event.content, " 你是谁");
    }

    #[test]
    fn test_from_json_respects_kind() {
        let payload = r#"{ "id": "1", "group_openid": "G1", "author": { "member_openid": "O" } }"#;

        assert!(InboundEvent::from_json(ChannelKind::Guild, payload).is_err());
        assert_eq!(InboundEvent::from_json(ChannelKind::Group, payload).unwrap().kind(), ChannelKind::Group);
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(MsgType::Text.code(), 0);
        assert_eq!(MsgType::Media.code(), 7);
        assert_eq!(MediaType::Image.code(), 1);
        assert_eq!(InboundEvent::Group(GroupEvent::default()).kind(), ChannelKind::Group);
    }
}
