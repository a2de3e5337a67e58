//! Entity Push Bridge - upstream entity feed to WebSocket fan-out
//!
//! This crate connects a single upstream push feed of entity snapshots and
//! update batches to any number of WebSocket subscribers. The upstream is
//! only kept running while at least one subscriber is connected.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
