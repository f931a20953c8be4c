//! Pure state transitions. No I/O happens here: every side effect is
//! returned as an [`Effect`] for the store to carry out in order.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        track::TrackIdentity,
        trash::{Membership, TrashList, TrashSet},
        uri::UriKind,
    },
    store::{keys, messages},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    /// Auto-skip trashed tracks at all
    Enabled,
    /// Show the floating trash button
    WidgetEnabled,
    /// Jump to the next non-trashed track instead of a plain skip
    ReshuffleOnSkip,
}

impl Setting {
    pub const ALL: [Setting; 3] = [
        Setting::Enabled,
        Setting::WidgetEnabled,
        Setting::ReshuffleOnSkip,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Setting::Enabled => keys::ENABLED,
            Setting::WidgetEnabled => keys::WIDGET_ENABLED,
            Setting::ReshuffleOnSkip => keys::RESHUFFLE_ON_SKIP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub enabled: bool,
    pub widget_enabled: bool,
    pub reshuffle_on_skip: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            widget_enabled: true,
            reshuffle_on_skip: false,
        }
    }
}

impl Settings {
    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::Enabled => self.enabled,
            Setting::WidgetEnabled => self.widget_enabled,
            Setting::ReshuffleOnSkip => self.reshuffle_on_skip,
        }
    }

    fn set(&mut self, setting: Setting, value: bool) {
        match setting {
            Setting::Enabled => self.enabled = value,
            Setting::WidgetEnabled => self.widget_enabled = value,
            Setting::ReshuffleOnSkip => self.reshuffle_on_skip = value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrashbinState {
    pub trash: TrashSet,
    pub settings: Settings,
    /// Set when the user went back to a track on purpose; the next
    /// track change plays it instead of skipping.
    pub user_hit_back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(UriKind, String),
    Remove(UriKind, String),
    Toggle(UriKind, String),
    ReplaceAll { songs: TrashList, artists: TrashList },
    ClearAll,
    SetSetting(Setting, bool),
    SetUserHitBack(bool),
}

/// What gets written back to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    Songs,
    Artists,
    Setting(Setting),
}

impl Stored {
    pub fn key(self) -> &'static str {
        match self {
            Stored::Songs => keys::SONGS,
            Stored::Artists => keys::ARTISTS,
            Stored::Setting(setting) => setting.key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Persist(Stored),
    Advance,
    Notify(&'static str),
}

#[derive(Debug)]
pub struct Transition {
    pub state: TrashbinState,
    pub effects: Vec<Effect>,
    /// Membership of the acted-upon URI, for single-item actions.
    pub membership: Option<Membership>,
}

fn stored_list(kind: UriKind) -> Stored {
    match kind {
        UriKind::Song => Stored::Songs,
        UriKind::Artist => Stored::Artists,
    }
}

fn change_message(kind: UriKind, membership: Membership) -> &'static str {
    match (kind, membership) {
        (UriKind::Song, Membership::Trashed) => messages::SONG_ADDED,
        (UriKind::Song, Membership::Clear) => messages::SONG_REMOVED,
        (UriKind::Artist, Membership::Trashed) => messages::ARTIST_ADDED,
        (UriKind::Artist, Membership::Clear) => messages::ARTIST_REMOVED,
    }
}

/// The playing track should be skipped right away when this change is
/// what trashed it. A track that was already trashed before (e.g. the
/// user went back to it) is left alone.
fn newly_trashed(
    before: &TrashSet,
    after: &TrashSet,
    settings: &Settings,
    current: Option<&TrackIdentity>,
) -> bool {
    let Some(current) = current else {
        return false;
    };
    settings.enabled
        && !before.is_effectively_trashed(Some(current))
        && after.is_effectively_trashed(Some(current))
}

fn single_item(
    state: &TrashbinState,
    kind: UriKind,
    uri: &str,
    current: Option<&TrackIdentity>,
    change: impl FnOnce(&mut TrashSet) -> Membership,
) -> Transition {
    let mut next = state.clone();
    let membership = change(&mut next.trash);

    let mut effects = vec![Effect::Persist(stored_list(kind))];
    if membership.is_trashed() && newly_trashed(&state.trash, &next.trash, &state.settings, current) {
        effects.push(Effect::Advance);
    }
    effects.push(Effect::Notify(change_message(kind, membership)));

    log::debug!("{kind} {uri} is now {membership:?}");
    Transition {
        state: next,
        effects,
        membership: Some(membership),
    }
}

/// Applies `action` to `state`. `current` is the track playing right now.
pub fn transition(
    state: &TrashbinState,
    action: Action,
    current: Option<&TrackIdentity>,
) -> Transition {
    match action {
        Action::Add(kind, uri) => single_item(state, kind, &uri, current, |trash| {
            trash.add(kind, &uri);
            Membership::Trashed
        }),
        Action::Remove(kind, uri) => single_item(state, kind, &uri, current, |trash| {
            trash.remove(kind, &uri);
            Membership::Clear
        }),
        Action::Toggle(kind, uri) => {
            single_item(state, kind, &uri, current, |trash| trash.toggle(kind, &uri))
        }
        Action::ReplaceAll { songs, artists } => {
            let mut next = state.clone();
            next.trash.replace_all(songs, artists);
            Transition {
                state: next,
                effects: vec![Effect::Persist(Stored::Songs), Effect::Persist(Stored::Artists)],
                membership: None,
            }
        }
        Action::ClearAll => {
            let mut next = state.clone();
            next.trash.clear();
            Transition {
                state: next,
                effects: vec![
                    Effect::Persist(Stored::Songs),
                    Effect::Persist(Stored::Artists),
                    Effect::Notify(messages::TRASHBIN_CLEARED),
                ],
                membership: None,
            }
        }
        Action::SetSetting(setting, value) => {
            let mut next = state.clone();
            next.settings.set(setting, value);
            Transition {
                state: next,
                effects: vec![Effect::Persist(Stored::Setting(setting))],
                membership: None,
            }
        }
        Action::SetUserHitBack(hit_back) => {
            let mut next = state.clone();
            next.user_hit_back = hit_back;
            Transition {
                state: next,
                effects: vec![],
                membership: None,
            }
        }
    }
}
