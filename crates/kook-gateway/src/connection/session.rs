//! Session state and lifecycle transitions
//!
//! `SessionState::apply` is the whole connection state machine. It mutates
//! the state and returns the effects the socket loop must carry out; it never
//! performs I/O itself.

use kook_common::GatewaySettings;
use serde_json::Value;
use std::time::Duration;

use super::sequencer::{Admission, Sequencer};
use crate::protocol::HelloOutcome;

/// Connection lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// Nothing resolved; the next step is an endpoint lookup
    Init,
    /// Gateway URL known, no socket yet
    GatewayResolved,
    /// Socket open, handshake pending
    SocketOpen,
    /// Handshake complete, heartbeat running
    Sessioned,
}

impl ConnectionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::GatewayResolved => "gateway_resolved",
            Self::SocketOpen => "socket_open",
            Self::Sessioned => "sessioned",
        }
    }

    /// Whether a socket is (or was last) open
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::SocketOpen | Self::Sessioned)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconnect policy, fixed at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub inter_backoff: Duration,
    pub error_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&GatewaySettings::default())
    }
}

impl From<&GatewaySettings> for ReconnectPolicy {
    fn from(settings: &GatewaySettings) -> Self {
        Self {
            inter_backoff: settings.inter_backoff(),
            error_backoff: settings.error_backoff(),
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Endpoint lookup succeeded
    GatewayResolved { url: String },
    /// Socket open completed
    SocketOpened,
    /// Hello frame received
    Hello { code: i64, session_id: String },
    /// ResumeAck frame received
    ResumeAck,
    /// Reconnect frame received
    ReconnectRequested,
    /// The sequencer buffer is full
    SequencerOverflow,
    /// The socket closed or errored
    SocketClosed,
    /// The socket could not be opened
    ConnectFailed,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartHeartbeat,
    StopHeartbeat,
    CloseSocket,
    /// Status moved from one value to another
    StatusChanged(ConnectionStatus),
}

/// Per-connection session state
///
/// Owned by one connection manager task. The sequencer lives here so a hard
/// reset clears the watermark together with the session id.
#[derive(Debug)]
pub struct SessionState {
    status: ConnectionStatus,
    gateway_url: Option<String>,
    session_id: Option<String>,
    self_user_id: String,
    reconnect_attempts: u32,
    /// Whether the current socket reached `Sessioned`
    socket_established: bool,
    sequencer: Sequencer<Value>,
    max_attempts: u32,
}

impl SessionState {
    #[must_use]
    pub fn new(max_attempts: u32, max_pending_events: usize) -> Self {
        Self {
            status: ConnectionStatus::Init,
            gateway_url: None,
            session_id: None,
            self_user_id: String::new(),
            reconnect_attempts: 0,
            socket_established: false,
            sequencer: Sequencer::new(max_pending_events),
            max_attempts,
        }
    }

    /// Build from gateway settings
    #[must_use]
    pub fn from_settings(settings: &GatewaySettings) -> Self {
        Self::new(settings.max_reconnect_attempts, settings.max_pending_events)
    }

    // === Accessors ===

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn gateway_url(&self) -> Option<&str> {
        self.gateway_url.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Bot's own user id, empty while unknown
    pub fn self_user_id(&self) -> &str {
        &self.self_user_id
    }

    pub fn set_self_user_id(&mut self, id: impl Into<String>) {
        self.self_user_id = id.into();
    }

    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    #[must_use]
    pub fn highest_delivered(&self) -> u64 {
        self.sequencer.highest_delivered()
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.sequencer.pending_len()
    }

    /// Whether the heartbeat should ping
    #[must_use]
    pub fn is_sessioned(&self) -> bool {
        self.status == ConnectionStatus::Sessioned
    }

    // === Sequencing ===

    /// Feed one event payload through the sequencer
    pub fn admit(&mut self, sequence: u64, payload: Value) -> Admission<Value> {
        self.sequencer.admit(sequence, payload)
    }

    // === Transitions ===

    /// Apply one lifecycle event
    pub fn apply(&mut self, event: LifecycleEvent) -> Vec<Effect> {
        use ConnectionStatus::{GatewayResolved, Init, SocketOpen, Sessioned};

        let mut effects = Vec::new();
        match (self.status, event) {
            (Init, LifecycleEvent::GatewayResolved { url }) => {
                self.gateway_url = Some(url);
                self.transition(GatewayResolved, &mut effects);
            }

            (GatewayResolved | SocketOpen | Sessioned, LifecycleEvent::SocketOpened) => {
                self.socket_established = false;
                self.transition(SocketOpen, &mut effects);
            }

            (SocketOpen, LifecycleEvent::Hello { code, session_id }) => {
                match HelloOutcome::from_code(code) {
                    HelloOutcome::Established => {
                        self.session_id = Some(session_id).filter(|id| !id.is_empty());
                        self.establish(&mut effects);
                    }
                    HelloOutcome::Fatal(_) => self.hard_reset(&mut effects),
                    HelloOutcome::Rejected(_) => {}
                }
            }

            (SocketOpen, LifecycleEvent::ResumeAck) => self.establish(&mut effects),

            (SocketOpen | Sessioned, LifecycleEvent::ReconnectRequested)
            | (_, LifecycleEvent::SequencerOverflow) => self.hard_reset(&mut effects),

            (status, LifecycleEvent::SocketClosed) => {
                effects.push(Effect::StopHeartbeat);
                if status != Init && !self.socket_established {
                    self.record_failure(&mut effects);
                }
                self.socket_established = false;
            }

            (_, LifecycleEvent::ConnectFailed) => self.record_failure(&mut effects),

            // Everything else (e.g. ResumeAck while already sessioned) is a no-op
            _ => {}
        }
        effects
    }

    fn transition(&mut self, to: ConnectionStatus, effects: &mut Vec<Effect>) {
        if self.status != to {
            self.status = to;
            effects.push(Effect::StatusChanged(to));
        }
    }

    fn establish(&mut self, effects: &mut Vec<Effect>) {
        self.reconnect_attempts = 0;
        self.socket_established = true;
        self.transition(ConnectionStatus::Sessioned, effects);
        effects.push(Effect::StartHeartbeat);
    }

    /// Clear session id, gateway URL, and sequencer, and close the socket
    fn hard_reset(&mut self, effects: &mut Vec<Effect>) {
        effects.push(Effect::StopHeartbeat);
        effects.push(Effect::CloseSocket);
        self.clear_session();
        self.transition(ConnectionStatus::Init, effects);
    }

    fn clear_session(&mut self) {
        self.session_id = None;
        self.gateway_url = None;
        self.socket_established = false;
        self.sequencer.reset();
    }

    fn record_failure(&mut self, effects: &mut Vec<Effect>) {
        self.reconnect_attempts += 1;
        if self.reconnect_attempts >= self.max_attempts {
            self.reconnect_attempts = 0;
            self.clear_session();
            self.transition(ConnectionStatus::Init, effects);
        }
    }
}
