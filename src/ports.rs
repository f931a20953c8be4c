//! Collaborators the store talks to. The host (or a test) supplies them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{skip::PlaybackContext, track::TrackIdentity},
    storage::error::StorageError,
};

/// String key-value storage, the host's local storage.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Request to play a specific track inside a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpRequest {
    pub context_uri: String,
    pub track_uri: String,
    pub queue_slot_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player rejected jump to {track_uri}: {reason}")]
    JumpRejected { track_uri: String, reason: String },
}

pub trait PlayerPort {
    fn current_track(&self) -> Option<TrackIdentity>;

    fn context(&self) -> PlaybackContext;

    /// Plain "next", no arguments.
    fn advance(&mut self);

    fn jump_to(&mut self, request: &JumpRequest) -> Result<(), PlayerError>;
}

/// Fire-and-forget user messages.
pub trait NotifierPort {
    fn notify(&mut self, message: &str);
}
