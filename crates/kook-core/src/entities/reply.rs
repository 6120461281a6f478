//! Reply entities - what the router hands back and what a send produces

use serde::{Deserialize, Serialize};

/// One reply produced by the routing collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, rename = "mediaUrl", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl ReplyPayload {
    /// Create a text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            media_url: None,
        }
    }

    /// Create a media reply
    pub fn media(url: impl Into<String>) -> Self {
        Self {
            text: None,
            media_url: Some(url.into()),
        }
    }

    /// Content to transmit: the text, or the media URL when there is no text
    ///
    /// Returns `None` when the payload has nothing to send.
    pub fn outbound_content(&self) -> Option<&str> {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => Some(text),
            _ => self.media_url.as_deref().filter(|url| !url.is_empty()),
        }
    }
}

/// Result of a single message-create call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl SendReceipt {
    /// Receipt for an accepted message
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            ok: true,
            message_id: Some(message_id.into()),
        }
    }

    /// Receipt for a message the API refused
    pub fn rejected() -> Self {
        Self {
            ok: false,
            message_id: None,
        }
    }
}
