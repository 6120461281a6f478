//! Collaborator traits (ports) - what the gateway needs from its host runtime

mod collaborators;

pub use collaborators::{ReplyRouter, RouterResult, StatusSink};
