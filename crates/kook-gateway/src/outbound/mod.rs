//! Outbound reply delivery

mod chunker;
mod sender;

pub use chunker::chunk_text;
pub use sender::OutboundSender;
