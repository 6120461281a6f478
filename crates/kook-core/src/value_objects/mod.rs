//! Value objects - immutable types that represent domain concepts

mod target;

pub use target::ReplyTarget;
