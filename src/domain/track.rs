use serde::{Deserialize, Serialize};

/// A playable item as the host reports it.
///
/// `primary_artist_uri` is logically artist index 0 and
/// `additional_artist_uris` continue at index 1, 2, ...
/// A missing primary artist means no artist is consulted at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackIdentity {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub primary_artist_uri: Option<String>,
    #[serde(default)]
    pub additional_artist_uris: Vec<String>,
    #[serde(default)]
    pub queue_slot_id: Option<String>,
}

impl TrackIdentity {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, artist_uri: impl Into<String>) -> Self {
        let artist_uri = artist_uri.into();
        if self.primary_artist_uri.is_none() {
            self.primary_artist_uri = Some(artist_uri);
        } else {
            self.additional_artist_uris.push(artist_uri);
        }
        self
    }

    pub fn with_queue_slot(mut self, slot: impl Into<String>) -> Self {
        self.queue_slot_id = Some(slot.into());
        self
    }

    /// Track URI, or `None` when the host gave no usable identifier.
    pub fn valid_uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|uri| !uri.is_empty())
    }

    /// Artist URIs in host order, primary first.
    pub fn artist_uris(&self) -> impl Iterator<Item = &str> {
        self.primary_artist_uri.iter().flat_map(|primary| {
            std::iter::once(primary.as_str())
                .chain(self.additional_artist_uris.iter().map(String::as_str))
        })
    }
}
