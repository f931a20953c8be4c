//! Picking what to play instead of a trashed track.

use serde::{Deserialize, Serialize};

use crate::domain::{track::TrackIdentity, trash::TrashSet};

/// The playback session as the host currently sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackContext {
    #[serde(default)]
    pub context_uri: Option<String>,
    #[serde(default)]
    pub upcoming_tracks: Vec<TrackIdentity>,
}

impl PlaybackContext {
    pub fn new(context_uri: impl Into<String>, upcoming_tracks: Vec<TrackIdentity>) -> Self {
        Self {
            context_uri: Some(context_uri.into()),
            upcoming_tracks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SkipDecision {
    /// Let the host advance to whatever comes next.
    AdvanceOnly,
    /// Play this exact upcoming track inside the current context.
    JumpTo {
        track_uri: String,
        queue_slot_id: Option<String>,
    },
}

/// Finds the first upcoming track that is safe to play.
///
/// Without a context there is nothing to jump within, and with reshuffle
/// off the host just advances. The scan is strictly in queue order and
/// the first non-trashed track wins.
pub fn resolve_skip_target(
    context: &PlaybackContext,
    trash: &TrashSet,
    reshuffle_enabled: bool,
) -> SkipDecision {
    if context.context_uri.is_none() || !reshuffle_enabled {
        return SkipDecision::AdvanceOnly;
    }

    context
        .upcoming_tracks
        .iter()
        .find(|track| !trash.is_effectively_trashed(Some(track)))
        .and_then(|track| {
            Some(SkipDecision::JumpTo {
                track_uri: track.valid_uri()?.to_string(),
                queue_slot_id: track.queue_slot_id.clone(),
            })
        })
        .unwrap_or(SkipDecision::AdvanceOnly)
}
