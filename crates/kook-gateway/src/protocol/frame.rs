//! Gateway frame format
//!
//! Every frame is a JSON object `{"s": <type>, "sn": <seq>?, "d": {...}?}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CodecError, CodecResult, FrameType, HelloPayload};

/// A decoded gateway frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayFrame {
    /// Frame type
    #[serde(rename = "s")]
    pub frame_type: FrameType,

    /// Sequence number (inbound events) or the client watermark (outbound ping)
    #[serde(rename = "sn", skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,

    /// Frame payload
    #[serde(rename = "d", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Wire shape before the frame type is checked
#[derive(Deserialize)]
struct RawFrame {
    s: i64,
    #[serde(default)]
    sn: Option<u64>,
    #[serde(default)]
    d: Option<Value>,
}

impl GatewayFrame {
    // === Client Frames ===

    /// Keepalive carrying the highest delivered sequence number (s=2)
    #[must_use]
    pub fn ping(sequence: u64) -> Self {
        Self {
            frame_type: FrameType::Ping,
            sequence: Some(sequence),
            payload: None,
        }
    }

    // === Server Frames ===

    /// Sequenced event (s=0)
    #[must_use]
    pub fn event(sequence: u64, payload: Value) -> Self {
        Self {
            frame_type: FrameType::Event,
            sequence: Some(sequence),
            payload: Some(payload),
        }
    }

    /// Handshake result (s=1)
    #[must_use]
    pub fn hello(payload: &HelloPayload) -> Self {
        Self {
            frame_type: FrameType::Hello,
            sequence: None,
            payload: serde_json::to_value(payload).ok(),
        }
    }

    /// Frame with no sequence and no payload (pong, reconnect, resume ack)
    #[must_use]
    pub fn bare(frame_type: FrameType) -> Self {
        Self {
            frame_type,
            sequence: None,
            payload: None,
        }
    }

    // === Codec ===

    /// Decode a text frame
    ///
    /// Fails on invalid JSON, an unknown frame type, or an event without `sn`.
    pub fn decode(text: &str) -> CodecResult<Self> {
        let raw: RawFrame = serde_json::from_str(text)?;
        let frame_type = u8::try_from(raw.s)
            .ok()
            .and_then(FrameType::from_u8)
            .ok_or(CodecError::UnknownFrameType(raw.s))?;

        if frame_type == FrameType::Event && raw.sn.is_none() {
            return Err(CodecError::MissingSequence);
        }

        Ok(Self {
            frame_type,
            sequence: raw.sn,
            payload: raw.d,
        })
    }

    /// Encode to a JSON string
    pub fn encode(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Hello payload, defaulting to an empty one when `d` is missing or malformed
    #[must_use]
    pub fn hello_payload(&self) -> HelloPayload {
        self.payload
            .as_ref()
            .and_then(|d| HelloPayload::deserialize(d).ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GatewayFrame(s={}", self.frame_type)?;
        if let Some(sn) = self.sequence {
            write!(f, ", sn={sn}")?;
        }
        write!(f, ")")
    }
}
