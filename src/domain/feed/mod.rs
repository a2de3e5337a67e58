//! Feed payloads - what the upstream feed delivers and subscribers receive.
//!
//! These types are forwarded verbatim, so their serde shape is the wire
//! contract toward downstream clients.

mod entity;
mod initial_dump;
mod update_batch;

pub use entity::Entity;
pub use initial_dump::InitialDump;
pub use update_batch::UpdateBatch;
