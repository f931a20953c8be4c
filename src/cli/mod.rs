use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::backup::{SUGGESTED_FILE_NAME, TrashDocument};
use crate::config;
use crate::domain::{track::TrackIdentity, uri::UriKind};
use crate::host::{
    metadata::HostSnapshot,
    notify::{ConsoleNotifier, RecordingNotifier},
    player::ObservedPlayer,
};
use crate::http::server::HttpServer;
use crate::storage::db::i64_seconds_to_local_time;
use crate::storage::kv::SqliteStorage;
use crate::store::{
    mutator::TrashStore,
    state::{Setting, Settings},
};

#[derive(Parser)]
#[command(name = "trashbin")]
#[command(version = "0.1")]
#[command(about = "Songs and artists you never want to hear again")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show trashbin counts and settings
    Status,
    /// List trashed songs and artists
    List,
    /// Trash a track or artist URI, or restore it if already trashed
    Toggle { uri: String },
    /// Trash a track or artist URI
    Add { uri: String },
    /// Restore a track or artist URI
    Remove { uri: String },
    /// Check whether a track would be skipped
    Check {
        /// Track URI
        uri: String,
        /// Artist URIs of the track, primary first
        #[arg(short, long)]
        artist: Vec<String>,
    },
    /// Decide what to do for a host playback snapshot (JSON file)
    Resolve { snapshot: PathBuf },
    /// Change a setting
    Set {
        #[arg(value_enum)]
        setting: Setting,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Save the trashbin to a JSON file
    Export { path: Option<PathBuf> },
    /// Replace the trashbin with the contents of a JSON file
    Import { path: PathBuf },
    /// Print the trashbin as JSON
    Copy,
    /// Empty the trashbin
    Clear,
    /// Run the http bridge for the host player
    Serve,
}

type CliStore = TrashStore<SqliteStorage, ObservedPlayer, ConsoleNotifier>;

fn classify(uri: &str) -> anyhow::Result<UriKind> {
    UriKind::of(uri).ok_or_else(|| anyhow!("{uri} is neither a track nor an artist URI"))
}

fn print_settings(settings: &Settings) {
    for setting in Setting::ALL {
        println!("  {:?}: {}", setting, settings.get(setting));
    }
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::Config::load(&cli.config)?;
    let storage = SqliteStorage::new(&cfg.storage).context("Failed to initialize storage")?;

    let mut store: CliStore = TrashStore::load(storage, ObservedPlayer::new(), ConsoleNotifier);

    match cli.command {
        Commands::Status => {
            let stats = store.stats();
            println!("Songs in trash: {}", stats.songs);
            println!("Artists in trash: {}", stats.artists);
            println!("Total items: {}", stats.total);
            match store.storage().last_updated()? {
                Some(at) => println!("Last changed {}", i64_seconds_to_local_time(at)?),
                None => println!("Never changed"),
            }
            println!("Settings:");
            print_settings(store.settings());
        }

        Commands::List => {
            let TrashDocument { songs, artists } = store.snapshot();
            println!("Songs ({}):", songs.len());
            for uri in songs.keys() {
                println!("    - {uri}");
            }
            println!("Artists ({}):", artists.len());
            for uri in artists.keys() {
                println!("    - {uri}");
            }
        }

        Commands::Toggle { uri } => {
            let membership = store.toggle_uri(&uri)?;
            println!("{uri} is now {membership:?}");
        }

        Commands::Add { uri } => store.add(classify(&uri)?, &uri),

        Commands::Remove { uri } => store.remove(classify(&uri)?, &uri),

        Commands::Check { uri, artist } => {
            let track = artist
                .into_iter()
                .fold(TrackIdentity::new(uri.clone()), TrackIdentity::with_artist);
            if store.is_effectively_trashed(Some(&track)) {
                println!("{uri} is trashed and would be skipped");
            } else {
                println!("{uri} is not trashed");
            }
        }

        Commands::Resolve { snapshot } => {
            let contents = std::fs::read_to_string(&snapshot)
                .with_context(|| format!("Failed to read {}", snapshot.to_string_lossy()))?;
            let snapshot: HostSnapshot =
                serde_json::from_str(&contents).context("Failed to parse playback snapshot")?;

            store.player_mut().observe_snapshot(&snapshot);
            let outcome = store.on_track_change();
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            for command in store.player_mut().take_commands() {
                println!("  -> {}", serde_json::to_string(&command)?);
            }
        }

        Commands::Set { setting, value } => {
            store.set_setting(setting, value);
            print_settings(store.settings());
        }

        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(SUGGESTED_FILE_NAME));
            store.export_backup(&path)?;
        }

        Commands::Import { path } => store.import_backup(&path)?,

        Commands::Copy => println!("{}", store.copy()?),

        Commands::Clear => store.clear_all(),

        Commands::Serve => {
            let store = TrashStore::load(
                store.into_storage(),
                ObservedPlayer::new(),
                RecordingNotifier::default(),
            );
            let http_server = HttpServer::new(store, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }
    }

    Ok(())
}
