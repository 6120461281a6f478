//! Status patches - partial updates of an account's runtime snapshot
//!
//! The gateway emits one patch per lifecycle transition. Only the fields that
//! changed are set; the host merges patches into its own snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partial update of an account's runtime status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_stop_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_inbound_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl StatusPatch {
    /// Patch reporting whether the connection is live
    pub fn running(running: bool) -> Self {
        Self {
            running: Some(running),
            ..Self::default()
        }
    }

    /// Patch emitted when the provider starts
    pub fn started(at: DateTime<Utc>) -> Self {
        Self {
            running: Some(true),
            last_start_at: Some(at),
            ..Self::default()
        }
    }

    /// Final patch emitted after shutdown
    pub fn stopped(at: DateTime<Utc>) -> Self {
        Self {
            running: Some(false),
            connected: Some(false),
            last_stop_at: Some(at),
            ..Self::default()
        }
    }

    /// Patch emitted after an inbound message was dispatched
    pub fn inbound(at: DateTime<Utc>) -> Self {
        Self {
            last_inbound_at: Some(at),
            ..Self::default()
        }
    }

    /// Patch recording an operational error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            last_error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Set the `connected` flag
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = Some(connected);
        self
    }
}
