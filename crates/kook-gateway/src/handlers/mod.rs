//! Inbound frame handling
//!
//! Routes each decoded frame to the sequencer or the state machine based on
//! its frame type.

mod heartbeat;

pub use heartbeat::{next_beat, HeartbeatMonitor};

use serde_json::Value;

use crate::connection::{Admission, Effect, LifecycleEvent, SessionState};
use crate::protocol::{FrameType, GatewayFrame, HelloOutcome};

/// Result of handling one frame
#[derive(Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Effects for the socket loop to execute
    pub effects: Vec<Effect>,
    /// Event payloads released in sequence order
    pub events: Vec<Value>,
}

impl FrameOutcome {
    fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            events: Vec::new(),
        }
    }
}

/// Handle one inbound frame against the session state
pub fn handle_frame(state: &mut SessionState, frame: GatewayFrame) -> FrameOutcome {
    match frame.frame_type {
        FrameType::Event => {
            // decode guarantees events carry a sequence number
            let Some(sequence) = frame.sequence else {
                return FrameOutcome::default();
            };
            let payload = frame.payload.unwrap_or(Value::Null);

            match state.admit(sequence, payload) {
                Admission::Released(events) => FrameOutcome {
                    effects: Vec::new(),
                    events,
                },
                Admission::Buffered => {
                    tracing::debug!(
                        sn = sequence,
                        watermark = state.highest_delivered(),
                        pending = state.pending_events(),
                        "Event buffered out of order"
                    );
                    FrameOutcome::default()
                }
                Admission::Duplicate => {
                    tracing::debug!(sn = sequence, "Duplicate event discarded");
                    FrameOutcome::default()
                }
                Admission::Overflow => {
                    tracing::warn!(
                        sn = sequence,
                        pending = state.pending_events(),
                        "Event buffer full, resetting session"
                    );
                    FrameOutcome::effects(state.apply(LifecycleEvent::SequencerOverflow))
                }
            }
        }
        FrameType::Hello => {
            let hello = frame.hello_payload();
            let code = hello.code();
            match HelloOutcome::from_code(code) {
                HelloOutcome::Established => {
                    tracing::info!(session_id = %hello.session_id(), "Gateway session established");
                }
                HelloOutcome::Fatal(reason) => {
                    tracing::warn!(code, %reason, "Handshake rejected, re-resolving gateway");
                }
                HelloOutcome::Rejected(_) => {
                    tracing::warn!(code, "Handshake failed");
                }
            }
            FrameOutcome::effects(state.apply(LifecycleEvent::Hello {
                code,
                session_id: hello.session_id().to_string(),
            }))
        }
        FrameType::Pong => {
            tracing::trace!("Pong received");
            FrameOutcome::default()
        }
        FrameType::Reconnect => {
            tracing::info!("Server requested reconnect");
            FrameOutcome::effects(state.apply(LifecycleEvent::ReconnectRequested))
        }
        FrameType::ResumeAck => {
            tracing::info!("Session resumed");
            FrameOutcome::effects(state.apply(LifecycleEvent::ResumeAck))
        }
        FrameType::Ping => {
            tracing::debug!("Ignoring client-only frame from server");
            FrameOutcome::default()
        }
    }
}
