//! Inbound event pipeline
//!
//! Classification of ordered event payloads and delivery to the reply router.

mod classifier;
mod dispatcher;
mod queue;

pub use classifier::{Classification, DropReason, EventClassifier};
pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use queue::DispatchQueue;
