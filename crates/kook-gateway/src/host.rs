//! Stand-alone collaborators for running the gateway without a host runtime

use async_trait::async_trait;
use kook_core::{InboundMessage, ReplyPayload, ReplyRouter, RouterResult, StatusPatch, StatusSink};

/// Replies with the message body it received
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoReplyRouter;

#[async_trait]
impl ReplyRouter for EchoReplyRouter {
    async fn route(&self, message: InboundMessage) -> RouterResult<Vec<ReplyPayload>> {
        tracing::info!(
            from = %message.conversation_label(),
            peer_id = %message.peer_id(),
            "Echoing inbound message"
        );
        Ok(vec![ReplyPayload::text(message.body_text)])
    }
}

/// Logs every status patch
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn on_status(&self, account_id: &str, patch: StatusPatch) {
        match serde_json::to_string(&patch) {
            Ok(json) => tracing::info!(account_id, status = %json, "Status update"),
            Err(e) => tracing::warn!(account_id, error = %e, "Status update not serializable"),
        }
    }
}
