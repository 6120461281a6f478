//! Reply target - the `user:<id>` / `channel:<id>` address of an outbound message

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::ChatType;
use crate::error::DomainError;

/// Address of an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReplyTarget {
    /// Direct message to a user
    User(String),
    /// Message into a channel
    Channel(String),
}

impl ReplyTarget {
    /// Target for replying in the conversation an event came from
    pub fn for_chat(chat_type: ChatType, author_id: &str, target_id: &str) -> Self {
        if chat_type.is_direct() {
            Self::User(author_id.to_string())
        } else {
            Self::Channel(target_id.to_string())
        }
    }

    /// Parse a target identifier
    ///
    /// Accepts `user:<id>`, `channel:<id>` or a bare id (treated as a channel).
    /// Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        let target = if let Some(id) = trimmed.strip_prefix("user:") {
            Self::User(id.trim().to_string())
        } else if let Some(id) = trimmed.strip_prefix("channel:") {
            Self::Channel(id.trim().to_string())
        } else {
            Self::Channel(trimmed.to_string())
        };

        if target.id().is_empty() {
            return Err(DomainError::InvalidTarget(raw.to_string()));
        }
        Ok(target)
    }

    /// The bare id sent as `target_id` to the REST API
    pub fn id(&self) -> &str {
        match self {
            Self::User(id) | Self::Channel(id) => id,
        }
    }
}

impl fmt::Display for ReplyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Channel(id) => write!(f, "channel:{id}"),
        }
    }
}
