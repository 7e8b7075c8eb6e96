//! Trace replay command.
//!
//! Reads a JSON array of tile lifecycle events, plays them against a fresh
//! index, and reports which copy of each label ended up shown. The command
//! stands in for a renderer's tile cache: it owns every tile's symbol
//! container for as long as the tile is registered.
//!
//! ```json
//! [
//!   {"op": "add", "layer": "road-label", "tile": {"zoom": 1, "col": 0, "row": 0},
//!    "max_zoom": 14, "symbols": [{"x": 1536, "y": 1536, "key": "Main St", "opacity": 1.0}]},
//!   {"op": "remove", "layer": "road-label", "tile": {"zoom": 1, "col": 0, "row": 0},
//!    "max_zoom": 14}
//! ]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crosstile::coord::TileCoord;
use crosstile::cross_tile::{CrossTileSymbolIndex, IndexConfig, IndexSnapshot};
use crosstile::symbol::{Anchor, DuplicateState, OpacityState, SymbolInstance, TileSymbols};

use super::common::{resolve_tile, KeyConfigArgs};
use crate::error::CliError;

/// Arguments for `crosstile replay`.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Path to the JSON trace file
    pub trace: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: KeyConfigArgs,
}

/// A tile coordinate as written in traces.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TraceTile {
    pub zoom: u8,
    pub col: u32,
    pub row: u32,
}

/// A symbol as written in traces.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceSymbol {
    pub x: f64,
    pub y: f64,
    pub key: String,
    /// Fade state of both text and icon when the tile loads.
    #[serde(default)]
    pub opacity: f32,
}

/// One tile lifecycle event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TraceEvent {
    Add {
        layer: String,
        tile: TraceTile,
        max_zoom: u8,
        #[serde(default)]
        symbols: Vec<TraceSymbol>,
    },
    Remove {
        layer: String,
        tile: TraceTile,
        max_zoom: u8,
    },
}

/// A label copy that is currently shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShownLabel {
    pub tile: String,
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub opacity: f32,
}

/// Result of replaying a trace.
#[derive(Debug, Serialize)]
pub struct ReplayOutcome {
    pub events: usize,
    pub snapshot: IndexSnapshot,
    /// Authoritative copies by layer id.
    pub shown: BTreeMap<String, Vec<ShownLabel>>,
}

/// Read and parse a trace file.
pub fn load_trace(path: &Path) -> Result<Vec<TraceEvent>, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let events: Vec<TraceEvent> =
        serde_json::from_str(&contents).map_err(|source| CliError::Trace {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), events = events.len(), "Loaded trace");
    Ok(events)
}

/// Play `events` against a new index built from `config`.
///
/// Stops at the first event the index rejects.
pub fn replay(events: &[TraceEvent], config: IndexConfig) -> Result<ReplayOutcome, CliError> {
    let mut index = CrossTileSymbolIndex::with_config(config)?;
    // Containers live here while their tile is registered
    let mut containers: BTreeMap<(String, TileCoord), TileSymbols> = BTreeMap::new();

    for (number, event) in events.iter().enumerate() {
        match event {
            TraceEvent::Add {
                layer,
                tile,
                max_zoom,
                symbols,
            } => {
                let coord = resolve_tile(tile.row, tile.col, tile.zoom, *max_zoom)?;
                let container = TileSymbols::new(symbols.iter().map(to_instance).collect());
                index
                    .add_tile_layer(layer, coord, *max_zoom, &container)
                    .map_err(|source| CliError::Replay {
                        event: number,
                        source,
                    })?;
                containers.insert((layer.clone(), coord), container);
            }
            TraceEvent::Remove {
                layer,
                tile,
                max_zoom,
            } => {
                let coord = resolve_tile(tile.row, tile.col, tile.zoom, *max_zoom)?;
                index
                    .remove_tile_layer(layer, coord, *max_zoom)
                    .map_err(|source| CliError::Replay {
                        event: number,
                        source,
                    })?;
                containers.remove(&(layer.clone(), coord));
            }
        }
    }

    let mut shown: BTreeMap<String, Vec<ShownLabel>> = BTreeMap::new();
    for ((layer, coord), container) in &containers {
        for symbol in container.lock().iter() {
            if symbol.duplicate != DuplicateState::Authoritative {
                continue;
            }
            shown.entry(layer.clone()).or_default().push(ShownLabel {
                tile: coord.to_string(),
                key: symbol.key.to_string(),
                x: symbol.anchor.x,
                y: symbol.anchor.y,
                opacity: symbol.text_opacity.opacity,
            });
        }
    }

    info!(events = events.len(), tiles = containers.len(), "Replay complete");

    Ok(ReplayOutcome {
        events: events.len(),
        snapshot: index.snapshot(),
        shown,
    })
}

fn to_instance(symbol: &TraceSymbol) -> SymbolInstance {
    let fade = OpacityState::new(symbol.opacity, symbol.opacity > 0.0);
    SymbolInstance::new(Anchor::new(symbol.x, symbol.y), symbol.key.as_str())
        .with_opacity(fade, fade)
}

/// Run the replay command.
pub fn run(args: ReplayArgs) -> Result<(), CliError> {
    let config = args.config.to_config()?;
    let events = load_trace(&args.trace)?;
    let outcome = replay(&events, config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).map_err(CliError::Output)?;
        println!("{}", json);
        return Ok(());
    }

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &ReplayOutcome) {
    println!("Replayed {} events", outcome.events);
    println!();

    if outcome.snapshot.layers.is_empty() {
        println!("No layers registered.");
        return;
    }

    for layer in &outcome.snapshot.layers {
        println!("[{}]", layer.layer_id);
        println!("  Tiles:         {}", layer.tiles);
        println!("  Zoom levels:   {:?}", layer.zoom_levels);
        println!("  Symbols:       {}", layer.symbols);
        println!("  Authoritative: {}", layer.authoritative);
        println!("  Suppressed:    {}", layer.suppressed);
        println!("  Unevaluated:   {}", layer.unevaluated);

        if let Some(labels) = outcome.shown.get(&layer.layer_id) {
            println!("  Shown:");
            for label in labels {
                println!(
                    "    {:<24} {:>10} ({}, {}) opacity {:.2}",
                    label.key, label.tile, label.x, label.y, label.opacity
                );
            }
        }
        println!();
    }
}
