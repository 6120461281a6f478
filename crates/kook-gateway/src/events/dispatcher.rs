//! Event dispatcher
//!
//! Classifies each ordered event, hands forwarded messages to the reply
//! router, and relays the router's replies through the outbound sender.
//! Router and send failures are logged; they never stop the connection.

use chrono::Utc;
use kook_core::{ReplyRouter, StatusPatch, StatusSink};
use serde_json::Value;
use std::sync::Arc;

use super::classifier::{Classification, DropReason, EventClassifier};
use crate::outbound::OutboundSender;

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dropped(DropReason),
    /// Routed; counts the replies that were sent and those that failed
    Routed { sent: usize, failed: usize },
    /// The router returned an error
    RouterFailed,
}

/// Per-account event pipeline
pub struct EventDispatcher {
    account_id: String,
    classifier: EventClassifier,
    router: Arc<dyn ReplyRouter>,
    sender: OutboundSender,
    status: Arc<dyn StatusSink>,
}

impl EventDispatcher {
    pub fn new(
        account_id: impl Into<String>,
        classifier: EventClassifier,
        router: Arc<dyn ReplyRouter>,
        sender: OutboundSender,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            classifier,
            router,
            sender,
            status,
        }
    }

    /// Handle one event payload released by the sequencer
    pub async fn dispatch(&self, payload: Value, self_user_id: &str) -> DispatchOutcome {
        let message = match self.classifier.classify(&payload, self_user_id) {
            Classification::Forward(message) => message,
            Classification::Drop(reason) => {
                if let DropReason::NotAllowed { author_id } = &reason {
                    tracing::info!(author_id = %author_id, "Message rejected: author not allowed");
                } else {
                    tracing::debug!(reason = %reason, "Event dropped");
                }
                return DispatchOutcome::Dropped(reason);
            }
        };

        let target = message.reply_target.clone();
        tracing::debug!(
            message_id = %message.message_id,
            chat_type = %message.chat_type,
            from = %message.conversation_label(),
            "Routing inbound message"
        );

        let outcome = match self.router.route(message).await {
            Ok(replies) => {
                let mut sent = 0;
                let mut failed = 0;
                for reply in &replies {
                    let Some(content) = reply.outbound_content() else {
                        continue;
                    };
                    match self.sender.send_to(&target, content).await {
                        Ok(_) => sent += 1,
                        Err(e) => {
                            failed += 1;
                            tracing::warn!(reply_target = %target, error = %e, "Reply failed");
                            self.status
                                .on_status(&self.account_id, StatusPatch::error(e.to_string()));
                        }
                    }
                }
                DispatchOutcome::Routed { sent, failed }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reply router failed");
                self.status
                    .on_status(&self.account_id, StatusPatch::error(e.to_string()));
                DispatchOutcome::RouterFailed
            }
        };

        self.status
            .on_status(&self.account_id, StatusPatch::inbound(Utc::now()));
        outcome
    }
}
