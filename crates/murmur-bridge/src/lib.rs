//! Messaging backend bridge for Murmur
//!
//! Delivers composed messages to the backend's `send_message` RPC over HTTP,
//! with a dry-run variant that only logs.

mod client;
mod error;
pub mod wire;

pub use client::{BridgeConfig, DryRunBridge, HttpBridge};
pub use error::{BridgeError, BridgeResult};
