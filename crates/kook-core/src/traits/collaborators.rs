//! Collaborator traits
//!
//! The gateway core defines what it needs from the host; the host provides the
//! implementation and injects it into each connection manager at construction.

use async_trait::async_trait;

use crate::entities::{InboundMessage, ReplyPayload};
use crate::error::DomainError;
use crate::events::StatusPatch;

/// Result type for router calls
pub type RouterResult<T> = Result<T, DomainError>;

// ============================================================================
// Reply Router
// ============================================================================

/// Routes a normalized inbound message to an agent and collects its replies
#[async_trait]
pub trait ReplyRouter: Send + Sync {
    /// Handle one inbound message, returning zero or more reply payloads
    async fn route(&self, message: InboundMessage) -> RouterResult<Vec<ReplyPayload>>;
}

// ============================================================================
// Status Sink
// ============================================================================

/// Receives lifecycle status patches for one account
pub trait StatusSink: Send + Sync {
    /// Called on every lifecycle transition
    fn on_status(&self, account_id: &str, patch: StatusPatch);
}
