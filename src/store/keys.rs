//! Local storage keys, shared with earlier installs of the extension.

pub const SONGS: &str = "TrashSongList";
pub const ARTISTS: &str = "TrashArtistList";
pub const ENABLED: &str = "trashbin-enabled";
pub const WIDGET_ENABLED: &str = "TrashbinWidgetIcon";
pub const RESHUFFLE_ON_SKIP: &str = "trashbin-reshuffle";
