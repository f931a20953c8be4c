use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    backup::TrashDocument,
    config::HttpConfig,
    domain::{
        skip::{PlaybackContext, SkipDecision, resolve_skip_target},
        track::TrackIdentity,
        trash::Membership,
        uri::UriKind,
    },
    host::{
        metadata::HostSnapshot,
        notify::RecordingNotifier,
        player::{ObservedPlayer, PlayerCommand},
    },
    http::error::ApiError,
    store::{
        mutator::{SkipOutcome, TrashStore},
        state::{Setting, Settings},
    },
    storage::kv::SqliteStorage,
};

pub type HostStore = TrashStore<SqliteStorage, ObservedPlayer, RecordingNotifier>;

pub struct HttpServer {
    store: Arc<Mutex<HostStore>>,
    pub config: HttpConfig,
}

/// Result of a call plus what the host must do next.
#[derive(Serialize, Deserialize)]
struct HostReply<T> {
    result: T,
    commands: Vec<PlayerCommand>,
    notifications: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ToggleRequest {
    uri: String,
    /// Latest playback, when the host has something newer than the last
    /// track change.
    #[serde(default)]
    snapshot: Option<HostSnapshot>,
}

#[derive(Serialize, Deserialize)]
struct SelectionRequest {
    uris: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct SelectionResponse {
    can_toggle: bool,
    label: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WidgetResponse {
    visible: bool,
    label: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    uri: String,
    kind: Option<UriKind>,
    trashed: bool,
    can_toggle: bool,
    label: String,
}

#[derive(Serialize, Deserialize)]
struct SkipTargetResponse {
    current_trashed: bool,
    decision: SkipDecision,
}

#[derive(Serialize, Deserialize)]
struct SettingRequest {
    setting: Setting,
    value: bool,
}

impl HttpServer {
    pub fn new(store: HostStore, config: HttpConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/trash) => {
                self.get_trash()
            },
            (PUT) (/trash) => {
                self.put_trash(request)
            },
            (DELETE) (/trash) => {
                self.delete_trash()
            },
            (POST) (/toggle) => {
                self.toggle(request)
            },
            (GET) (/status/{uri: String}) => {
                self.status(uri)
            },
            (POST) (/can-toggle) => {
                self.can_toggle(request)
            },
            (POST) (/widget) => {
                self.widget(request)
            },
            (POST) (/back) => {
                self.back()
            },
            (POST) (/track-change) => {
                self.track_change(request)
            },
            (POST) (/skip-target) => {
                self.skip_target(request)
            },
            (GET) (/settings) => {
                self.get_settings()
            },
            (PUT) (/settings) => {
                self.put_setting(request)
            },
            _ => Ok(Response::empty_404())
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn lock(&self) -> Result<MutexGuard<'_, HostStore>, ApiError> {
        self.store
            .lock()
            .map_err(|e| ApiError::Internal(format!("could not access trashbin store under lock: {e}")))
    }

    /// Wraps a result together with the commands and notifications the
    /// store produced while computing it.
    fn reply<T: Serialize>(store: &mut HostStore, result: T) -> Response {
        Response::json(&HostReply {
            result,
            commands: store.player_mut().take_commands(),
            notifications: store.notifier_mut().take_messages(),
        })
    }

    fn get_trash(&self) -> Result<Response, ApiError> {
        let store = self.lock()?;
        Ok(Response::json(&store.snapshot()))
    }

    fn put_trash(&self, request: &Request) -> Result<Response, ApiError> {
        let document: TrashDocument = rouille::input::json_input(request)?;
        let mut store = self.lock()?;
        store.import_document(document);
        let stats = store.stats();
        Ok(Self::reply(&mut store, stats))
    }

    fn delete_trash(&self) -> Result<Response, ApiError> {
        let mut store = self.lock()?;
        store.clear_all();
        let stats = store.stats();
        Ok(Self::reply(&mut store, stats))
    }

    fn toggle(&self, request: &Request) -> Result<Response, ApiError> {
        let body: ToggleRequest = rouille::input::json_input(request)?;
        let mut store = self.lock()?;
        if let Some(snapshot) = &body.snapshot {
            store.player_mut().observe_snapshot(snapshot);
        }
        let membership: Membership = store.toggle_uri(&body.uri)?;
        Ok(Self::reply(&mut store, membership))
    }

    fn status(&self, uri: String) -> Result<Response, ApiError> {
        let store = self.lock()?;
        Ok(Response::json(&StatusResponse {
            kind: UriKind::of(&uri),
            trashed: store.is_trashed_uri(&uri),
            can_toggle: store.can_toggle(std::slice::from_ref(&uri)),
            label: store.toggle_label(&uri).to_string(),
            uri,
        }))
    }

    /// Context menu: whether "throw" applies to a selection, and its text.
    fn can_toggle(&self, request: &Request) -> Result<Response, ApiError> {
        let body: SelectionRequest = rouille::input::json_input(request)?;
        let store = self.lock()?;
        let can_toggle = store.can_toggle(&body.uris);
        Ok(Response::json(&SelectionResponse {
            can_toggle,
            label: can_toggle.then(|| store.toggle_label(&body.uris[0]).to_string()),
        }))
    }

    /// Playbar widget for the reported playback.
    fn widget(&self, request: &Request) -> Result<Response, ApiError> {
        let snapshot: HostSnapshot = rouille::input::json_input(request)?;
        let mut store = self.lock()?;
        store.player_mut().observe_snapshot(&snapshot);
        let visible = store.widget_visible();
        let label = snapshot
            .track
            .and_then(|track| track.uri)
            .filter(|_| visible)
            .map(|uri| store.toggle_label(&uri).to_string());
        Ok(Response::json(&WidgetResponse { visible, label }))
    }

    fn back(&self) -> Result<Response, ApiError> {
        let mut store = self.lock()?;
        store.set_user_hit_back(true);
        Ok(Response::empty_204())
    }

    fn track_change(&self, request: &Request) -> Result<Response, ApiError> {
        let snapshot: HostSnapshot = rouille::input::json_input(request)?;
        let mut store = self.lock()?;
        store.player_mut().observe_snapshot(&snapshot);
        let outcome: SkipOutcome = store.on_track_change();
        Ok(Self::reply(&mut store, outcome))
    }

    /// Read-only: where would a skip go right now.
    fn skip_target(&self, request: &Request) -> Result<Response, ApiError> {
        let snapshot: HostSnapshot = rouille::input::json_input(request)?;
        let store = self.lock()?;
        let current = snapshot.track.as_ref().map(TrackIdentity::from);
        let context = PlaybackContext::from(&snapshot.context);
        Ok(Response::json(&SkipTargetResponse {
            current_trashed: store.is_effectively_trashed(current.as_ref()),
            decision: resolve_skip_target(
                &context,
                store.trash(),
                store.settings().reshuffle_on_skip,
            ),
        }))
    }

    fn get_settings(&self) -> Result<Response, ApiError> {
        let store = self.lock()?;
        Ok(Response::json(store.settings()))
    }

    fn put_setting(&self, request: &Request) -> Result<Response, ApiError> {
        let body: SettingRequest = rouille::input::json_input(request)?;
        let mut store = self.lock()?;
        store.set_setting(body.setting, body.value);
        let settings: Settings = *store.settings();
        Ok(Self::reply(&mut store, settings))
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::trash::TrashStats,
        ports::StoragePort,
        store::{keys, messages},
        storage::schema,
    };

    use rouille::Request;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    fn setup_store() -> anyhow::Result<HostStore> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(TrashStore::load(
            SqliteStorage::from_existing_conn(conn),
            ObservedPlayer::new(),
            RecordingNotifier::default(),
        ))
    }

    fn create_server() -> HttpServer {
        HttpServer::new(
            setup_store().unwrap(),
            HttpConfig {
                bind_addr: "127.0.0.1".to_string(),
                port: 8787,
            },
        )
    }

    fn json_request(method: &str, url: &str, body: Value) -> Request {
        Request::fake_http(
            method,
            url,
            vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body.to_string().into_bytes(),
        )
    }

    fn empty_request(method: &str, url: &str) -> Request {
        Request::fake_http(method, url, vec![], vec![])
    }

    fn playing_snapshot() -> Value {
        json!({
            "track": {
                "uri": "spotify:track:bad",
                "metadata": { "artist_uri": "spotify:artist:a" }
            },
            "context": {
                "context_uri": "spotify:playlist:p",
                "next_tracks": [
                    { "uri": "spotify:track:bad", "uid": "u1" },
                    { "uri": "spotify:track:good", "uid": "u2",
                      "metadata": { "artist_uri": "spotify:artist:b" } }
                ]
            }
        })
    }

    #[test]
    fn test_http_toggle_playing_track_returns_advance() -> anyhow::Result<()> {
        let server = create_server();

        let response = server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:track:bad", "snapshot": playing_snapshot() }),
        ));
        assert_eq!(response.status_code, 200);

        let body: Value = parse_json_response(response)?;
        assert_eq!(body["result"], "trashed");
        assert_eq!(body["commands"], json!([{ "command": "advance" }]));
        assert_eq!(body["notifications"], json!([messages::SONG_ADDED]));

        let store = server.lock().unwrap();
        assert_eq!(
            store.storage().get(keys::SONGS)?.as_deref(),
            Some(r#"{"spotify:track:bad":true}"#)
        );
        Ok(())
    }

    #[test]
    fn test_http_toggle_rejects_album() -> anyhow::Result<()> {
        let server = create_server();

        let response = server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:album:1" }),
        ));

        assert_eq!(response.status_code, 400);
        Ok(())
    }

    #[test]
    fn test_http_malformed_body_is_bad_request() {
        let server = create_server();

        let request = Request::fake_http(
            "POST",
            "/track-change",
            vec![("Content-Type".to_owned(), "application/json".to_owned())],
            b"{ nope".to_vec(),
        );

        assert_eq!(server.handle_request(&request).status_code, 400);
    }

    #[test]
    fn test_http_status_reports_label() -> anyhow::Result<()> {
        let server = create_server();
        server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:artist:a" }),
        ));

        let response = server.handle_request(&empty_request("GET", "/status/spotify:artist:a"));
        assert_eq!(response.status_code, 200);

        let body: StatusResponse = parse_json_response(response)?;
        assert_eq!(body.kind, Some(UriKind::Artist));
        assert!(body.trashed);
        assert_eq!(body.label, messages::UNTHROW);
        Ok(())
    }

    #[test]
    fn test_http_track_change_jumps_with_reshuffle() -> anyhow::Result<()> {
        let server = create_server();
        server.handle_request(&json_request(
            "PUT",
            "/settings",
            json!({ "setting": "reshuffle_on_skip", "value": true }),
        ));
        server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:track:bad" }),
        ));

        let response =
            server.handle_request(&json_request("POST", "/track-change", playing_snapshot()));
        let body: Value = parse_json_response(response)?;

        assert_eq!(
            body["result"],
            json!({ "outcome": "jumped", "track_uri": "spotify:track:good", "queue_slot_id": "u2" })
        );
        assert_eq!(
            body["commands"],
            json!([{
                "command": "jump_to",
                "context_uri": "spotify:playlist:p",
                "track_uri": "spotify:track:good",
                "queue_slot_id": "u2"
            }])
        );
        Ok(())
    }

    #[test]
    fn test_http_back_suppresses_next_skip() -> anyhow::Result<()> {
        let server = create_server();
        server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:track:bad" }),
        ));

        let response = server.handle_request(&empty_request("POST", "/back"));
        assert_eq!(response.status_code, 204);

        let response =
            server.handle_request(&json_request("POST", "/track-change", playing_snapshot()));
        let body: Value = parse_json_response(response)?;
        assert_eq!(body["result"], json!({ "outcome": "suppressed" }));
        assert_eq!(body["commands"], json!([]));
        Ok(())
    }

    #[test]
    fn test_http_skip_target_is_read_only() -> anyhow::Result<()> {
        let server = create_server();
        server.handle_request(&json_request(
            "PUT",
            "/trash",
            json!({ "songs": { "spotify:track:bad": true }, "artists": {} }),
        ));
        server.handle_request(&json_request(
            "PUT",
            "/settings",
            json!({ "setting": "reshuffle_on_skip", "value": true }),
        ));

        let response =
            server.handle_request(&json_request("POST", "/skip-target", playing_snapshot()));
        let body: SkipTargetResponse = parse_json_response(response)?;

        assert!(body.current_trashed);
        assert_eq!(
            body.decision,
            SkipDecision::JumpTo {
                track_uri: "spotify:track:good".into(),
                queue_slot_id: Some("u2".into()),
            }
        );
        assert!(server.lock().unwrap().player_mut().commands().is_empty());
        Ok(())
    }

    #[test]
    fn test_http_import_export_and_clear() -> anyhow::Result<()> {
        let server = create_server();
        let document = json!({
            "songs": { "spotify:track:1": true },
            "artists": { "spotify:artist:1": true }
        });

        let response = server.handle_request(&json_request("PUT", "/trash", document.clone()));
        let body: HostReply<TrashStats> = parse_json_response(response)?;
        assert_eq!(body.result.total, 2);
        assert_eq!(body.notifications, vec![messages::BACKUP_RESTORED_SUCCESS]);

        let exported: Value = parse_json_response(server.handle_request(&empty_request("GET", "/trash")))?;
        assert_eq!(exported, document);

        let response = server.handle_request(&empty_request("DELETE", "/trash"));
        let body: HostReply<TrashStats> = parse_json_response(response)?;
        assert_eq!(body.result.total, 0);
        assert_eq!(body.notifications, vec![messages::TRASHBIN_CLEARED]);
        Ok(())
    }

    #[test]
    fn test_http_settings_round_trip() -> anyhow::Result<()> {
        let server = create_server();

        let settings: Settings =
            parse_json_response(server.handle_request(&empty_request("GET", "/settings")))?;
        assert_eq!(settings, Settings::default());

        let response = server.handle_request(&json_request(
            "PUT",
            "/settings",
            json!({ "setting": "enabled", "value": false }),
        ));
        let body: HostReply<Settings> = parse_json_response(response)?;
        assert!(!body.result.enabled);
        Ok(())
    }

    #[test]
    fn test_http_toggle_without_snapshot_keeps_playing_track() -> anyhow::Result<()> {
        let server = create_server();
        server.handle_request(&json_request("POST", "/track-change", playing_snapshot()));

        let response = server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:artist:a" }),
        ));
        let body: Value = parse_json_response(response)?;

        assert_eq!(body["result"], "trashed");
        assert_eq!(body["commands"], json!([{ "command": "advance" }]));
        Ok(())
    }

    #[test]
    fn test_http_can_toggle_single_supported_uri() -> anyhow::Result<()> {
        let server = create_server();
        server.handle_request(&json_request(
            "POST",
            "/toggle",
            json!({ "uri": "spotify:track:1" }),
        ));

        let response = server.handle_request(&json_request(
            "POST",
            "/can-toggle",
            json!({ "uris": ["spotify:track:1"] }),
        ));
        let body: SelectionResponse = parse_json_response(response)?;
        assert!(body.can_toggle);
        assert_eq!(body.label.as_deref(), Some(messages::UNTHROW));

        let response = server.handle_request(&json_request(
            "POST",
            "/can-toggle",
            json!({ "uris": ["spotify:track:1", "spotify:track:2"] }),
        ));
        let body: SelectionResponse = parse_json_response(response)?;
        assert!(!body.can_toggle);
        assert_eq!(body.label, None);

        let response = server.handle_request(&empty_request("GET", "/status/spotify:album:1"));
        let body: StatusResponse = parse_json_response(response)?;
        assert!(!body.can_toggle);
        Ok(())
    }

    #[test]
    fn test_http_widget_follows_playback_and_setting() -> anyhow::Result<()> {
        let server = create_server();

        let response = server.handle_request(&json_request("POST", "/widget", json!({})));
        let body: WidgetResponse = parse_json_response(response)?;
        assert!(!body.visible);

        let response =
            server.handle_request(&json_request("POST", "/widget", playing_snapshot()));
        let body: WidgetResponse = parse_json_response(response)?;
        assert!(body.visible);
        assert_eq!(body.label.as_deref(), Some(messages::THROW));

        server.handle_request(&json_request(
            "PUT",
            "/settings",
            json!({ "setting": "widget_enabled", "value": false }),
        ));
        let response =
            server.handle_request(&json_request("POST", "/widget", playing_snapshot()));
        let body: WidgetResponse = parse_json_response(response)?;
        assert!(!body.visible);
        assert_eq!(body.label, None);
        Ok(())
    }

    #[test]
    fn test_http_unknown_route_is_404() {
        let server = create_server();

        let response = server.handle_request(&empty_request("GET", "/nope"));

        assert_eq!(response.status_code, 404);
    }
}
