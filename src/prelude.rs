pub use crate::base::{
    config::Config,
    error::RelayError,
    types::{ChannelKind, Err, GroupEvent, GuildEvent, InboundEvent, Res, Void},
};
pub use crate::interaction::{
    keyword::{KeywordMatcher, KeywordTable},
    message::ChannelMessage,
};
pub use crate::service::transport::{GenericTransport, Transport};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
