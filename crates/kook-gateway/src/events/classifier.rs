//! Event classifier
//!
//! Decides whether an ordered event payload is forwarded to the reply router
//! and, if so, builds the normalized inbound message. Pure and synchronous.

use kook_common::{normalize_allow_entry, AccountConfig};
use kook_core::{ChatType, InboundMessage, ReplyTarget};
use serde_json::Value;

use crate::protocol::{EventPayload, MESSAGE_TYPE_KMARKDOWN, MESSAGE_TYPE_SYSTEM, MESSAGE_TYPE_TEXT};

/// Why an event was not forwarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Payload missing or lacking a required field
    Malformed,
    /// System notification (type 255)
    SystemEvent,
    /// Written by the bot itself
    SelfAuthored,
    /// Neither text nor KMarkdown
    UnsupportedType(i64),
    /// The bot is not in the mention list
    NotMentioned,
    /// Author is not the configured allowed user
    NotAllowed { author_id: String },
    /// Nothing left after trimming
    EmptyBody,
}

impl DropReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::SystemEvent => "system_event",
            Self::SelfAuthored => "self_authored",
            Self::UnsupportedType(_) => "unsupported_type",
            Self::NotMentioned => "not_mentioned",
            Self::NotAllowed { .. } => "not_allowed",
            Self::EmptyBody => "empty_body",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Forward(InboundMessage),
    Drop(DropReason),
}

impl Classification {
    #[must_use]
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward(_))
    }
}

/// Per-account filter settings
#[derive(Debug, Clone)]
pub struct EventClassifier {
    account_id: String,
    /// Normalized allow-list entry
    allowed_user_id: Option<String>,
    require_mention: bool,
}

impl EventClassifier {
    pub fn new(
        account_id: impl Into<String>,
        allowed_user_id: Option<&str>,
        require_mention: bool,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            allowed_user_id: allowed_user_id
                .map(normalize_allow_entry)
                .filter(|id| !id.is_empty()),
            require_mention,
        }
    }

    /// Build from a resolved account
    pub fn for_account(account: &AccountConfig) -> Self {
        Self::new(
            account.account_id.clone(),
            account.allowed_user_id.as_deref(),
            account.require_mention,
        )
    }

    /// Classify one event payload
    ///
    /// `self_user_id` is empty while the bot's identity is unknown, which
    /// disables self-echo and mention filtering.
    pub fn classify(&self, payload: &Value, self_user_id: &str) -> Classification {
        let Ok(event) = EventPayload::from_value(payload) else {
            return Classification::Drop(DropReason::Malformed);
        };

        if event.kind == MESSAGE_TYPE_SYSTEM {
            return Classification::Drop(DropReason::SystemEvent);
        }
        if !self_user_id.is_empty() && event.author_id == self_user_id {
            return Classification::Drop(DropReason::SelfAuthored);
        }
        if event.kind != MESSAGE_TYPE_TEXT && event.kind != MESSAGE_TYPE_KMARKDOWN {
            return Classification::Drop(DropReason::UnsupportedType(event.kind));
        }

        let mentions_self = !self_user_id.is_empty() && event.mentions(self_user_id);
        if self.require_mention && !self_user_id.is_empty() && !mentions_self {
            return Classification::Drop(DropReason::NotMentioned);
        }

        if let Some(allowed) = &self.allowed_user_id {
            if event.author_id.trim() != allowed.as_str() {
                return Classification::Drop(DropReason::NotAllowed {
                    author_id: event.author_id,
                });
            }
        }

        let body_text = event.content.trim();
        if body_text.is_empty() {
            return Classification::Drop(DropReason::EmptyBody);
        }

        let chat_type = ChatType::from_channel_type(&event.channel_type);
        let sender_name = event
            .author_name()
            .map_or_else(|| event.author_id.clone(), str::to_string);

        Classification::Forward(InboundMessage {
            account_id: self.account_id.clone(),
            reply_target: ReplyTarget::for_chat(chat_type, &event.author_id, &event.target_id),
            body_text: body_text.to_string(),
            author_id: event.author_id,
            target_id: event.target_id,
            chat_type,
            message_id: event.msg_id,
            timestamp_ms: event.msg_timestamp,
            mentions_self,
            sender_name,
        })
    }
}
