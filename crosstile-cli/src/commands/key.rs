//! Key inspection command.
//!
//! Prints the composite key a symbol anchor projects to, which is what two
//! copies of a label must share to be treated as duplicates.

use clap::Args;
use crosstile::coord::TileCoord;
use crosstile::cross_tile::{KeyProjector, SymbolKey};
use crosstile::symbol::{Anchor, SymbolInstance};

use super::common::{resolve_tile, KeyConfigArgs};
use crate::error::CliError;

/// Arguments for `crosstile key`.
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Tile zoom level
    pub zoom: u8,

    /// Tile column
    pub col: u32,

    /// Tile row
    pub row: u32,

    /// Anchor x in tile units (may be negative for buffered symbols)
    #[arg(allow_negative_numbers = true)]
    pub x: f64,

    /// Anchor y in tile units
    #[arg(allow_negative_numbers = true)]
    pub y: f64,

    /// Content key of the symbol (e.g. the label text)
    pub key: String,

    /// Zoom to project onto (defaults to the tile's zoom)
    #[arg(long)]
    pub target_zoom: Option<u8>,

    /// Max native zoom of the tile source
    #[arg(long, default_value_t = 14)]
    pub max_zoom: u8,

    #[command(flatten)]
    pub config: KeyConfigArgs,
}

/// A projected key and the inputs that produced it.
#[derive(Debug)]
pub struct Projection {
    pub tile: TileCoord,
    pub target_zoom: u8,
    pub scale: f64,
    pub key: SymbolKey,
}

/// Project the anchor described by `args`.
pub fn project(args: &KeyArgs) -> Result<Projection, CliError> {
    let config = args.config.to_config()?;
    let tile = resolve_tile(args.row, args.col, args.zoom, args.max_zoom)?;
    let target_zoom = args.target_zoom.unwrap_or(args.zoom);

    let projector = KeyProjector::new(&config, args.max_zoom);
    let instance = SymbolInstance::new(Anchor::new(args.x, args.y), args.key.as_str());

    Ok(Projection {
        tile,
        target_zoom,
        scale: projector.scale(tile.zoom, target_zoom),
        key: projector.key(&instance, &tile, target_zoom),
    })
}

/// Run the key command.
pub fn run(args: KeyArgs) -> Result<(), CliError> {
    let projection = project(&args)?;

    println!("Tile:        {}", projection.tile);
    println!("Anchor:      ({}, {})", args.x, args.y);
    println!("Target zoom: {}", projection.target_zoom);
    println!("Scale:       {}", projection.scale);
    println!("Key:         {}", projection.key);

    Ok(())
}
