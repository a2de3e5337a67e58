//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects and error types that the feed and bridge
//! vocabularies are built on.

mod errors;
mod state_machine;
mod timestamp;

pub use errors::TransitionError;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
