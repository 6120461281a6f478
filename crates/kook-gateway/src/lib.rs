//! # kook-gateway
//!
//! Realtime gateway client for the Kook chat platform: endpoint lookup,
//! resumable websocket sessions, ordered event delivery, and reply relay.

pub mod api;
pub mod cli;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod host;
pub mod outbound;
pub mod protocol;
pub mod supervisor;

mod error;

pub use error::{GatewayError, GatewayResult};
pub use supervisor::{run, Supervisor};
