//! Gateway protocol definitions
//!
//! Frame types, the frame envelope, handshake codes, and typed payloads.

mod error;
mod frame;
mod frame_type;
mod hello_codes;
mod payloads;

pub use error::{CodecError, CodecResult};
pub use frame::GatewayFrame;
pub use frame_type::FrameType;
pub use hello_codes::{HelloCode, HelloOutcome, MISSING_CODE_DEFAULT};
pub use payloads::{
    Author, EventExtra, EventPayload, HelloPayload, MESSAGE_TYPE_KMARKDOWN, MESSAGE_TYPE_SYSTEM,
    MESSAGE_TYPE_TEXT,
};
