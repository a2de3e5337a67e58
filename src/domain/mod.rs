//! Domain layer - feed payloads and bridge lifecycle vocabulary.
//!
//! - `foundation` - Timestamp, state machine trait, domain errors
//! - `feed` - Entity, InitialDump, UpdateBatch
//! - `bridge` - LifecycleState

pub mod bridge;
pub mod feed;
pub mod foundation;
