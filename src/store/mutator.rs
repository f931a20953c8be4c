use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    backup::{BackupError, TrashDocument},
    domain::{
        skip::{SkipDecision, resolve_skip_target},
        track::TrackIdentity,
        trash::{Membership, TrashList, TrashSet, TrashStats},
        uri::UriKind,
    },
    ports::{JumpRequest, NotifierPort, PlayerPort, StoragePort},
    store::{
        StoreError, keys, messages,
        state::{Action, Effect, Setting, Settings, Stored, TrashbinState, transition},
    },
    storage::error::StorageError,
};

/// What happened when the playing track changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SkipOutcome {
    /// Nothing to do: disabled, nothing playing, or the track is fine.
    Played,
    /// Trashed, but the user went back to it on purpose.
    Suppressed,
    Advanced,
    Jumped {
        track_uri: String,
        queue_slot_id: Option<String>,
    },
    /// The host refused the jump; a plain advance was issued instead.
    JumpFailed { track_uri: String },
}

/// Single owner of the trashbin state.
///
/// Every mutation goes through [`transition`] and the resulting effects
/// are executed here: storage writes first, then player commands, then
/// notifications.
pub struct TrashStore<S, P, N> {
    state: TrashbinState,
    storage: S,
    player: P,
    notifier: N,
}

fn read_value<T: DeserializeOwned>(storage: &impl StoragePort, key: &str, default: T) -> T {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            log::warn!("could not read {key} from storage, using default: {e}");
            return default;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("stored {key} is malformed, using default: {e}");
            default
        }
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}

impl<S: StoragePort, P: PlayerPort, N: NotifierPort> TrashStore<S, P, N> {
    /// Builds the store from whatever storage holds. Missing or corrupt
    /// values fall back to their defaults.
    pub fn load(storage: S, player: P, notifier: N) -> Self {
        let defaults = Settings::default();
        let settings = Settings {
            enabled: read_value(&storage, keys::ENABLED, defaults.enabled),
            widget_enabled: read_value(&storage, keys::WIDGET_ENABLED, defaults.widget_enabled),
            reshuffle_on_skip: read_value(
                &storage,
                keys::RESHUFFLE_ON_SKIP,
                defaults.reshuffle_on_skip,
            ),
        };
        let trash = TrashSet::new(
            read_value(&storage, keys::SONGS, TrashList::new()),
            read_value(&storage, keys::ARTISTS, TrashList::new()),
        );
        log::info!(
            "trashbin loaded: {} songs, {} artists",
            trash.songs.len(),
            trash.artists.len()
        );

        Self {
            state: TrashbinState {
                trash,
                settings,
                user_hit_back: false,
            },
            storage,
            player,
            notifier,
        }
    }

    pub fn state(&self) -> &TrashbinState {
        &self.state
    }

    pub fn trash(&self) -> &TrashSet {
        &self.state.trash
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    fn persist(&mut self, stored: Stored) {
        let key = stored.key();
        let encoded = match stored {
            Stored::Songs => encode(key, &self.state.trash.songs),
            Stored::Artists => encode(key, &self.state.trash.artists),
            Stored::Setting(setting) => encode(key, &self.state.settings.get(setting)),
        };
        let result = encoded.and_then(|value| self.storage.set(key, &value));
        if let Err(e) = result {
            log::warn!("failed to persist {key}: {e}");
            self.notifier.notify(messages::STORAGE_WRITE_FAILED);
        }
    }

    /// Applies one action and runs its effects.
    pub fn dispatch(&mut self, action: Action) -> Option<Membership> {
        let current = self.player.current_track();
        let outcome = transition(&self.state, action, current.as_ref());
        self.state = outcome.state;

        for effect in outcome.effects {
            match effect {
                Effect::Persist(stored) => self.persist(stored),
                Effect::Advance => {
                    log::info!("playing track was just trashed, skipping");
                    self.player.advance();
                }
                Effect::Notify(message) => self.notifier.notify(message),
            }
        }
        outcome.membership
    }

    pub fn toggle(&mut self, kind: UriKind, uri: &str) -> Membership {
        self.dispatch(Action::Toggle(kind, uri.to_string()))
            .unwrap_or(Membership::Clear)
    }

    pub fn add(&mut self, kind: UriKind, uri: &str) {
        self.dispatch(Action::Add(kind, uri.to_string()));
    }

    pub fn remove(&mut self, kind: UriKind, uri: &str) {
        self.dispatch(Action::Remove(kind, uri.to_string()));
    }

    /// Toggles a URI after working out whether it is a song or an artist.
    pub fn toggle_uri(&mut self, uri: &str) -> Result<Membership, StoreError> {
        let kind = UriKind::of(uri).ok_or_else(|| StoreError::UnsupportedUri(uri.to_string()))?;
        Ok(self.toggle(kind, uri))
    }

    pub fn set_setting(&mut self, setting: Setting, value: bool) {
        self.dispatch(Action::SetSetting(setting, value));
    }

    pub fn set_user_hit_back(&mut self, hit_back: bool) {
        self.dispatch(Action::SetUserHitBack(hit_back));
    }

    pub fn replace_all(&mut self, songs: TrashList, artists: TrashList) {
        self.dispatch(Action::ReplaceAll { songs, artists });
    }

    pub fn clear_all(&mut self) {
        self.dispatch(Action::ClearAll);
    }

    pub fn snapshot(&self) -> TrashDocument {
        TrashDocument::from(&self.state.trash)
    }

    pub fn stats(&self) -> TrashStats {
        self.state.trash.stats()
    }

    pub fn is_effectively_trashed(&self, track: Option<&TrackIdentity>) -> bool {
        self.state.trash.is_effectively_trashed(track)
    }

    pub fn is_trashed_uri(&self, uri: &str) -> bool {
        UriKind::of(uri).is_some_and(|kind| self.state.trash.contains(kind, uri))
    }

    /// Whether the "throw" menu entry applies to this selection.
    pub fn can_toggle(&self, uris: &[String]) -> bool {
        match uris {
            [uri] => self.state.settings.enabled && UriKind::of(uri).is_some(),
            _ => false,
        }
    }

    pub fn toggle_label(&self, uri: &str) -> &'static str {
        if self.is_trashed_uri(uri) {
            messages::UNTHROW
        } else {
            messages::THROW
        }
    }

    pub fn widget_visible(&self) -> bool {
        let settings = &self.state.settings;
        settings.enabled && settings.widget_enabled && self.player.current_track().is_some()
    }

    /// Reacts to the host starting a new track.
    ///
    /// A pending "back" only covers this one change, whatever its outcome.
    pub fn on_track_change(&mut self) -> SkipOutcome {
        let hit_back = self.state.user_hit_back;
        if hit_back {
            self.set_user_hit_back(false);
        }

        if !self.state.settings.enabled {
            return SkipOutcome::Played;
        }
        let Some(current) = self.player.current_track() else {
            return SkipOutcome::Played;
        };
        if !self.state.trash.is_effectively_trashed(Some(&current)) {
            return SkipOutcome::Played;
        }
        if hit_back {
            log::debug!("user went back to a trashed track, letting it play");
            return SkipOutcome::Suppressed;
        }

        let context = self.player.context();
        let decision = resolve_skip_target(
            &context,
            &self.state.trash,
            self.state.settings.reshuffle_on_skip,
        );
        match (decision, context.context_uri) {
            (
                SkipDecision::JumpTo {
                    track_uri,
                    queue_slot_id,
                },
                Some(context_uri),
            ) => {
                let request = JumpRequest {
                    context_uri,
                    track_uri: track_uri.clone(),
                    queue_slot_id: queue_slot_id.clone(),
                };
                match self.player.jump_to(&request) {
                    Ok(()) => SkipOutcome::Jumped {
                        track_uri,
                        queue_slot_id,
                    },
                    Err(e) => {
                        log::warn!("{e}");
                        self.notifier.notify(messages::SKIP_FAILED);
                        self.player.advance();
                        SkipOutcome::JumpFailed { track_uri }
                    }
                }
            }
            _ => {
                self.player.advance();
                SkipOutcome::Advanced
            }
        }
    }

    /// Serialized trash lists, as copied to the clipboard.
    pub fn copy(&mut self) -> Result<String, BackupError> {
        let text = self.snapshot().to_json()?;
        self.notifier.notify(messages::COPIED);
        Ok(text)
    }

    pub fn export_backup(&mut self, path: &Path) -> Result<(), BackupError> {
        match self.snapshot().write_to(path) {
            Ok(()) => {
                self.notifier.notify(messages::BACKUP_SAVED_SUCCESS);
                Ok(())
            }
            Err(e) => {
                log::warn!("export to {} failed: {e}", path.to_string_lossy());
                self.notifier.notify(messages::BACKUP_SAVED_FAILED);
                Err(e)
            }
        }
    }

    /// Replaces both lists with an imported document.
    pub fn import_document(&mut self, document: TrashDocument) {
        self.replace_all(document.songs, document.artists);
        self.notifier.notify(messages::BACKUP_RESTORED_SUCCESS);
    }

    pub fn import_json(&mut self, text: &str) -> Result<(), BackupError> {
        let document = self.check_backup(TrashDocument::from_json(text))?;
        self.import_document(document);
        Ok(())
    }

    pub fn import_backup(&mut self, path: &Path) -> Result<(), BackupError> {
        let document = self.check_backup(TrashDocument::read_from(path))?;
        self.import_document(document);
        Ok(())
    }

    fn check_backup(
        &mut self,
        document: Result<TrashDocument, BackupError>,
    ) -> Result<TrashDocument, BackupError> {
        document.inspect_err(|e| {
            log::warn!("import failed: {e}");
            self.notifier.notify(messages::BACKUP_RESTORED_FAILED_FILE_READ);
        })
    }
}
