//! # kook-core
//!
//! Domain layer containing the normalized inbound message, reply types, lifecycle status
//! patches, and the traits the gateway uses to talk to its host runtime.
//! This crate has zero dependencies on infrastructure (sockets, HTTP, configuration).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{ChatType, InboundMessage, ReplyPayload, SendReceipt};
pub use error::DomainError;
pub use events::StatusPatch;
pub use traits::{ReplyRouter, RouterResult, StatusSink};
pub use value_objects::ReplyTarget;
