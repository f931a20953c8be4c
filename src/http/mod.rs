//! Local HTTP bridge for the script injected into the host player.

pub mod error;
pub mod server;
