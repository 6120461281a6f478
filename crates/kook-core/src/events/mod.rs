//! Lifecycle events reported to the host runtime

mod status;

pub use status::StatusPatch;
