//! Connection management
//!
//! Session state machine, event sequencer, socket setup, and the per-account
//! connection manager that ties them together.

mod manager;
mod sequencer;
mod session;
mod socket;

pub use manager::ConnectionManager;
pub use sequencer::{Admission, Sequencer};
pub use session::{
    ConnectionStatus, Effect, LifecycleEvent, ReconnectPolicy, SessionState,
};
pub use socket::{connect_url, GatewaySocket, ResumeParams};
