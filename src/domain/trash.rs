use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{track::TrackIdentity, uri::UriKind};

/// URI -> flag mapping as persisted and exported.
pub type TrashList = BTreeMap<String, bool>;

/// Whether an item is trashed after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    Trashed,
    Clear,
}

impl Membership {
    pub fn is_trashed(self) -> bool {
        self == Membership::Trashed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashStats {
    pub songs: usize,
    pub artists: usize,
    pub total: usize,
}

/// Songs and artists the user never wants to hear again.
///
/// Song and artist URIs live in separate maps and are never compared
/// against each other. An entry counts only while its flag is `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashSet {
    pub songs: TrashList,
    pub artists: TrashList,
    /// Entries stored as `false` that a toggle switched on. Toggling them
    /// off again writes `false` back instead of dropping the key.
    #[serde(skip)]
    revived: BTreeSet<(UriKind, String)>,
}

impl TrashSet {
    pub fn new(songs: TrashList, artists: TrashList) -> Self {
        Self {
            songs,
            artists,
            revived: BTreeSet::new(),
        }
    }

    fn list(&self, kind: UriKind) -> &TrashList {
        match kind {
            UriKind::Song => &self.songs,
            UriKind::Artist => &self.artists,
        }
    }

    fn list_mut(&mut self, kind: UriKind) -> &mut TrashList {
        match kind {
            UriKind::Song => &mut self.songs,
            UriKind::Artist => &mut self.artists,
        }
    }

    pub fn contains(&self, kind: UriKind, uri: &str) -> bool {
        self.list(kind).get(uri).copied().unwrap_or(false)
    }

    pub fn is_song_trashed(&self, uri: &str) -> bool {
        self.contains(UriKind::Song, uri)
    }

    pub fn is_artist_trashed(&self, uri: &str) -> bool {
        self.contains(UriKind::Artist, uri)
    }

    /// True when the track is banned directly or through any of its artists.
    ///
    /// A missing track or one without a URI is always trashed: an item
    /// that cannot be identified is never considered safe to play.
    pub fn is_effectively_trashed(&self, track: Option<&TrackIdentity>) -> bool {
        let Some(track) = track else {
            return true;
        };
        let Some(uri) = track.valid_uri() else {
            return true;
        };
        if self.is_song_trashed(uri) {
            return true;
        }
        track
            .artist_uris()
            .any(|artist| self.is_artist_trashed(artist))
    }

    pub fn add(&mut self, kind: UriKind, uri: &str) {
        self.revived.remove(&(kind, uri.to_string()));
        self.list_mut(kind).insert(uri.to_string(), true);
    }

    pub fn remove(&mut self, kind: UriKind, uri: &str) {
        self.revived.remove(&(kind, uri.to_string()));
        self.list_mut(kind).remove(uri);
    }

    /// Flips a single URI and reports where it ended up.
    ///
    /// Two toggles in a row leave the stored list exactly as it was,
    /// including a key that was present with a `false` flag.
    pub fn toggle(&mut self, kind: UriKind, uri: &str) -> Membership {
        let key = (kind, uri.to_string());
        if self.contains(kind, uri) {
            if self.revived.remove(&key) {
                self.list_mut(kind).insert(key.1, false);
            } else {
                self.list_mut(kind).remove(uri);
            }
            Membership::Clear
        } else {
            if self.list(kind).contains_key(uri) {
                self.revived.insert(key);
            }
            self.list_mut(kind).insert(uri.to_string(), true);
            Membership::Trashed
        }
    }

    /// Overwrites both lists wholesale, no merge.
    pub fn replace_all(&mut self, songs: TrashList, artists: TrashList) {
        self.songs = songs;
        self.artists = artists;
        self.revived.clear();
    }

    pub fn clear(&mut self) {
        self.songs.clear();
        self.artists.clear();
        self.revived.clear();
    }

    /// Detached copy of both lists.
    pub fn snapshot(&self) -> (TrashList, TrashList) {
        (self.songs.clone(), self.artists.clone())
    }

    pub fn stats(&self) -> TrashStats {
        TrashStats {
            songs: self.songs.len(),
            artists: self.artists.len(),
            total: self.songs.len() + self.artists.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.artists.is_empty()
    }
}
