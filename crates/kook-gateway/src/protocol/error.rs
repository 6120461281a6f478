//! Codec error types

use thiserror::Error;

/// Frame decode failure
///
/// Malformed frames are dropped; this error only travels as far as a debug log.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown frame type: {0}")]
    UnknownFrameType(i64),

    #[error("Event frame without sequence number")]
    MissingSequence,
}

/// Codec result type
pub type CodecResult<T> = Result<T, CodecError>;
