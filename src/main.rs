//! # persistence-demo
//!
//! Drives a [`Store`] over the in-memory adapter: observes a sorted query,
//! saves and deletes a few songs, and prints every state the store publishes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use persistence_middleware::adapter::memory::{MemoryAdapter, Persistable, Query};
use persistence_middleware::adapter::AdapterState;
use persistence_middleware::config::{Config, LoggingConfig};
use persistence_middleware::logging::init_tracing;
use persistence_middleware::{PersistenceAction, ProcessState, RequestState, Store};

#[derive(Parser)]
#[command(name = "persistence-demo")]
#[command(about = "Save, delete and observe songs through the persistence store")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the config file
    #[arg(long)]
    log: Option<String>,

    /// Only list songs by this artist
    #[arg(long)]
    artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Song {
    id: u32,
    title: String,
    artist: String,
    year: u16,
}

impl Song {
    fn new(id: u32, title: &str, artist: &str, year: u16) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            year,
        }
    }
}

impl Persistable for Song {
    fn key(&self) -> String {
        format!("song-{}", self.id)
    }
}

type DemoState = AdapterState<MemoryAdapter<Song>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    let logging = match cli.log {
        Some(filter) => LoggingConfig { filter },
        None => config.logging.clone(),
    };
    init_tracing(&logging);

    let adapter = MemoryAdapter::builder(&config.memory)
        .seed([
            Song::new(1, "Says", "Nils Frahm", 2013),
            Song::new(2, "Near Light", "Olafur Arnalds", 2013),
            Song::new(3, "Re", "Nils Frahm", 2009),
        ])
        .build()
        .context("seeding the memory adapter")?;

    let mut query = Query::all().sort_by("year", true).sort_by("title", true);
    if let Some(artist) = &cli.artist {
        query = query.field_eq("artist", artist.as_str());
    }

    let added = Song::new(4, "Ambre", "Nils Frahm", 2015);
    let removed = Song::new(2, "Near Light", "Olafur Arnalds", 2013);
    // A write is done once its lane succeeded and the query reflects it.
    let added_listed = query.matches(&serde_json::to_value(&added)?);

    let store = Store::spawn(adapter);
    let mut states = store.subscribe();

    store.dispatch(PersistenceAction::request(query))?;
    wait_for(&mut states, |s| s.request.elements().is_some()).await?;

    store.dispatch(PersistenceAction::save(added.clone()))?;
    wait_for(&mut states, |s| {
        s.persist == ProcessState::Succeeded && lists(s, &added) == Some(added_listed)
    })
    .await?;

    store.dispatch(PersistenceAction::delete(removed.clone()))?;
    wait_for(&mut states, |s| {
        s.delete == ProcessState::Succeeded && lists(s, &removed) == Some(false)
    })
    .await?;

    let final_state = store.state();
    store.shutdown().await;

    match final_state.request.elements() {
        Some(songs) => {
            println!("\n{} song(s):", songs.len());
            for song in songs {
                println!("  {} - {} ({})", song.artist, song.title, song.year);
            }
        }
        None => bail!("query ended in {:?}", final_state.request),
    }
    Ok(())
}

/// Whether the received list holds `song`; `None` until a list arrives.
fn lists(state: &DemoState, song: &Song) -> Option<bool> {
    state.request.elements().map(|songs| songs.contains(song))
}

async fn wait_for<F>(states: &mut mpsc::UnboundedReceiver<DemoState>, done: F) -> Result<()>
where
    F: Fn(&DemoState) -> bool,
{
    loop {
        let state = tokio::time::timeout(Duration::from_secs(5), states.recv())
            .await
            .context("timed out waiting for the store")?
            .context("store stopped publishing states")?;
        print_state(&state);
        if let RequestState::Failed { error, .. } = &state.request {
            bail!("query failed: {}", error);
        }
        if done(&state) {
            return Ok(());
        }
    }
}

fn print_state(state: &DemoState) {
    let request = match &state.request {
        RequestState::Received(songs) => format!("Received({} songs)", songs.len()),
        other => format!("{:?}", other),
    };
    println!(
        "request={:<22} persist={:<10} delete={}",
        request,
        lane_label(&state.persist),
        lane_label(&state.delete)
    );
}

fn lane_label(lane: &ProcessState<Song, persistence_middleware::PersistenceError>) -> String {
    match lane {
        ProcessState::Failed { error, .. } => format!("Failed({})", error.kind()),
        other => format!("{:?}", other),
    }
}
