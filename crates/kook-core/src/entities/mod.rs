//! Domain entities - messages flowing into and out of the gateway

mod message;
mod reply;

pub use message::{ChatType, InboundMessage};
pub use reply::{ReplyPayload, SendReceipt};
