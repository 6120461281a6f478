//! Inbound message entity - a chat event that survived classification

use serde::{Deserialize, Serialize};

use crate::value_objects::ReplyTarget;

/// Conversation kind of an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// One-to-one conversation with a user
    Direct,
    /// Broadcast conversation
    Group,
    /// Guild text channel
    Channel,
}

impl ChatType {
    /// Map the platform's raw `channel_type` tag
    ///
    /// `PERSON` is a direct message, `BROADCAST` a group; everything else is a channel.
    #[must_use]
    pub fn from_channel_type(tag: &str) -> Self {
        match tag {
            "PERSON" => Self::Direct,
            "BROADCAST" => Self::Group,
            _ => Self::Channel,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
            Self::Channel => "channel",
        }
    }

    #[inline]
    pub fn is_direct(self) -> bool {
        matches!(self, Self::Direct)
    }
}

impl std::fmt::Display for ChatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized inbound chat message
///
/// Built once per forwarded event and handed to the reply router, which consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Account whose gateway connection received the event
    pub account_id: String,
    pub author_id: String,
    /// Channel id, or the peer user id for direct messages
    pub target_id: String,
    pub chat_type: ChatType,
    /// Trimmed message content
    pub body_text: String,
    pub message_id: String,
    /// Platform timestamp in milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Whether the bot's own id appeared in the mention list
    pub mentions_self: bool,
    /// Display name of the author, falling back to the author id
    pub sender_name: String,
    /// Where replies to this message are addressed
    pub reply_target: ReplyTarget,
}

impl InboundMessage {
    /// Id of the conversation peer: the author for direct chats, the channel otherwise
    pub fn peer_id(&self) -> &str {
        if self.chat_type.is_direct() {
            &self.author_id
        } else {
            &self.target_id
        }
    }

    /// Human-readable description of where the message came from
    pub fn conversation_label(&self) -> String {
        if self.chat_type.is_direct() {
            format!("Kook user {}", self.sender_name)
        } else {
            format!("Kook user {} in channel {}", self.sender_name, self.target_id)
        }
    }
}
