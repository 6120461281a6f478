//! Integration test utilities for the Kook gateway
//!
//! Runs the gateway against a local websocket server standing in for the
//! Kook gateway and a wiremock server standing in for the REST API.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
