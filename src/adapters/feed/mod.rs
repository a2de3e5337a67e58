//! Upstream feed adapters.
//!
//! - [`SyntheticFeed`] - generated data on interval timers, used by the binary
//! - [`ScriptedFeed`] - fixed timeline on tokio's clock, for deterministic tests

mod scripted;
mod synthetic;

pub use scripted::{FeedCall, ScriptedEvent, ScriptedFeed};
pub use synthetic::{generate_batch, generate_dump, SyntheticFeed};
