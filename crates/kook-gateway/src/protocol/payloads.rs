//! Gateway payload definitions
//!
//! Typed views of the `d` field. Event payloads are decoded here, at the
//! parse boundary, so a payload missing a required field never reaches the
//! classifier.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::hello_codes::MISSING_CODE_DEFAULT;

/// System event message type
pub const MESSAGE_TYPE_SYSTEM: i64 = 255;
/// Plain text message type
pub const MESSAGE_TYPE_TEXT: i64 = 1;
/// KMarkdown message type, also used for outbound replies
pub const MESSAGE_TYPE_KMARKDOWN: i64 = 9;

/// Hello payload (s=1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl HelloPayload {
    /// Successful handshake
    #[must_use]
    pub fn success(session_id: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            session_id: Some(session_id.into()),
        }
    }

    /// Failed handshake
    #[must_use]
    pub fn failure(code: i64) -> Self {
        Self {
            code: Some(code),
            session_id: None,
        }
    }

    /// Result code, with a missing code read as a missing-parameters failure
    #[must_use]
    pub fn code(&self) -> i64 {
        self.code.unwrap_or(MISSING_CODE_DEFAULT)
    }

    /// Session id, empty when absent
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or_default()
    }
}

/// Message event payload (s=0)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventPayload {
    /// Message type (1 text, 9 KMarkdown, 255 system, ...)
    #[serde(rename = "type")]
    pub kind: i64,
    /// `GROUP`, `PERSON` or `BROADCAST`
    pub channel_type: String,
    #[serde(deserialize_with = "id_string")]
    pub target_id: String,
    #[serde(deserialize_with = "id_string")]
    pub author_id: String,
    pub content: String,
    pub msg_id: String,
    pub msg_timestamp: i64,
    /// Absent and `null` both read as an empty block
    #[serde(default, deserialize_with = "nullable_extra")]
    pub extra: EventExtra,
}

impl EventPayload {
    /// Decode from a raw `d` value
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Whether the mention list contains `user_id`
    #[must_use]
    pub fn mentions(&self, user_id: &str) -> bool {
        self.extra.mention.iter().any(|id| id == user_id)
    }

    /// Author display name, if the event carries one
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.extra
            .author
            .as_ref()
            .and_then(|author| author.username.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// `extra` object of a message event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventExtra {
    /// Mentioned user ids; the wire sends a single id or a list
    #[serde(default, deserialize_with = "mention_ids")]
    pub mention: Vec<String>,
    #[serde(default)]
    pub author: Option<Author>,
}

/// Author block inside `extra`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub username: Option<String>,
}

fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_id(&value).ok_or_else(|| de::Error::custom(format!("expected id, got {value}")))
}

fn nullable_extra<'de, D>(deserializer: D) -> Result<EventExtra, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EventExtra>::deserialize(deserializer)?.unwrap_or_default())
}

fn mention_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(scalar_id).collect(),
        other => scalar_id(&other).into_iter().collect(),
    })
}
