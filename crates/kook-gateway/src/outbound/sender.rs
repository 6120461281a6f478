//! Outbound sender
//!
//! Chunks reply text and posts each chunk with one message-create call,
//! strictly one after another. No retries.

use kook_core::{ReplyTarget, SendReceipt};
use std::sync::Arc;

use super::chunk_text;
use crate::api::MessageTransport;
use crate::GatewayResult;

/// Sends reply text for one account
#[derive(Clone)]
pub struct OutboundSender {
    transport: Arc<dyn MessageTransport>,
    chunk_limit: usize,
}

impl OutboundSender {
    pub fn new(transport: Arc<dyn MessageTransport>, chunk_limit: usize) -> Self {
        Self {
            transport,
            chunk_limit,
        }
    }

    /// Send `text` to a raw target string (`user:<id>`, `channel:<id>`, or a bare id)
    pub async fn send_text(&self, target: &str, text: &str) -> GatewayResult<Vec<SendReceipt>> {
        let target = ReplyTarget::parse(target)?;
        self.send_to(&target, text).await
    }

    /// Send `text` to a parsed target, one receipt per chunk
    ///
    /// Stops at the first transport failure; receipts for the chunks sent
    /// before it are lost with the error.
    pub async fn send_to(&self, target: &ReplyTarget, text: &str) -> GatewayResult<Vec<SendReceipt>> {
        let chunks = chunk_text(text, self.chunk_limit);
        let mut receipts = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let receipt = self.transport.create_message(target.id(), chunk).await?;
            if !receipt.ok {
                tracing::warn!(
                    reply_target = %target,
                    chunk = index,
                    "Kook rejected outbound message"
                );
            }
            receipts.push(receipt);
        }

        tracing::debug!(reply_target = %target, chunks = receipts.len(), "Reply sent");
        Ok(receipts)
    }
}
