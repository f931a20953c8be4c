//! Parsing of the host's raw player payloads.
//!
//! The host lists a track's artists as string-keyed pseudo-array fields:
//! `artist_uri`, `artist_uri:1`, `artist_uri:2`, ... Enumeration stops at
//! the first missing (or empty) index, even if a later index is present.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{skip::PlaybackContext, track::TrackIdentity};

const ARTIST_URI_KEY: &str = "artist_uri";

/// A track exactly as the host serializes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostTrack {
    #[serde(default)]
    pub uri: Option<String>,
    /// Queue slot, distinguishes repeated entries of one track.
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostContext {
    #[serde(default)]
    pub context_uri: Option<String>,
    #[serde(default)]
    pub next_tracks: Vec<HostTrack>,
}

/// Everything the host reports on a playback change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(default)]
    pub track: Option<HostTrack>,
    #[serde(default)]
    pub context: HostContext,
}

fn artist_key(index: usize) -> String {
    if index == 0 {
        ARTIST_URI_KEY.to_string()
    } else {
        format!("{ARTIST_URI_KEY}:{index}")
    }
}

/// Artist URIs in index order, up to the first gap.
pub fn artist_uris(metadata: &HashMap<String, String>) -> Vec<String> {
    (0..)
        .map(|index| metadata.get(&artist_key(index)))
        .take_while(|value| value.is_some_and(|uri| !uri.is_empty()))
        .flatten()
        .cloned()
        .collect()
}

impl From<&HostTrack> for TrackIdentity {
    fn from(track: &HostTrack) -> Self {
        let mut artists = artist_uris(&track.metadata).into_iter();
        TrackIdentity {
            uri: track.uri.clone(),
            primary_artist_uri: artists.next(),
            additional_artist_uris: artists.collect(),
            queue_slot_id: track.uid.clone(),
        }
    }
}

impl From<&HostContext> for PlaybackContext {
    fn from(context: &HostContext) -> Self {
        PlaybackContext {
            context_uri: context.context_uri.clone().filter(|uri| !uri.is_empty()),
            upcoming_tracks: context.next_tracks.iter().map(TrackIdentity::from).collect(),
        }
    }
}
