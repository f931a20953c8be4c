//! Adapters between the host player's payloads and the core.

pub mod metadata;
pub mod notify;
pub mod player;
