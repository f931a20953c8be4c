use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which trash list a URI belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UriKind {
    Song,
    Artist,
}

impl UriKind {
    /// Classifies a host URI of the form `<scheme>:<type>:<id>`.
    ///
    /// Only `track` and `artist` URIs can be trashed, everything else
    /// (albums, playlists, local files, garbage) returns `None`.
    pub fn of(uri: &str) -> Option<Self> {
        let mut parts = uri.split(':');
        let _scheme = parts.next()?;
        let kind = match parts.next()? {
            "track" => UriKind::Song,
            "artist" => UriKind::Artist,
            _ => return None,
        };
        match parts.next() {
            Some(id) if !id.is_empty() => Some(kind),
            _ => None,
        }
    }
}

impl Display for UriKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UriKind::Song => write!(f, "song"),
            UriKind::Artist => write!(f, "artist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UriKind;

    #[test]
    fn classifies_tracks_and_artists() {
        assert_eq!(UriKind::of("spotify:track:4uLU6hMCjMI75M1A2tKUQC"), Some(UriKind::Song));
        assert_eq!(UriKind::of("spotify:artist:0OdUWJ0sBjDrqHygGUXeCF"), Some(UriKind::Artist));
    }

    #[test]
    fn rejects_other_uris() {
        assert_eq!(UriKind::of("spotify:album:1DFixLWuPkv3KT3TnV35m3"), None);
        assert_eq!(UriKind::of("spotify:track:"), None);
        assert_eq!(UriKind::of("spotify:track"), None);
        assert_eq!(UriKind::of(""), None);
        assert_eq!(UriKind::of("not a uri"), None);
    }
}
