//! Kook REST API
//!
//! Endpoint lookup, self identity, message creation, and the account probe.

mod client;
mod envelope;
mod error;

pub use client::{probe_account, KookApiClient, MessageTransport, ProbeResult, ProbeUser};
pub use envelope::{ApiEnvelope, SelfUser};
pub use error::{ApiError, ApiResult};
