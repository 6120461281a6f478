//! Gateway frame types
//!
//! The `s` field of every frame exchanged over the Kook websocket.

use serde::{Serialize, Serializer};

/// Gateway frame types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Server pushes a sequenced event (server only)
    Event = 0,
    /// Handshake result (server only)
    Hello = 1,
    /// Keepalive carrying the client's watermark (client only)
    Ping = 2,
    /// Keepalive answer (server only)
    Pong = 3,
    /// Server asks the client to drop the session and start over (server only)
    Reconnect = 5,
    /// Resume accepted (server only)
    ResumeAck = 6,
}

impl FrameType {
    /// Create a `FrameType` from its raw value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Event),
            1 => Some(Self::Hello),
            2 => Some(Self::Ping),
            3 => Some(Self::Pong),
            5 => Some(Self::Reconnect),
            6 => Some(Self::ResumeAck),
            _ => None,
        }
    }

    /// Get the raw value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the name of this frame type
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Hello => "Hello",
            Self::Ping => "Ping",
            Self::Pong => "Pong",
            Self::Reconnect => "Reconnect",
            Self::ResumeAck => "ResumeAck",
        }
    }
}

impl Serialize for FrameType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
