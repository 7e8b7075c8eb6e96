//! Common types and utilities shared across CLI commands.

use clap::Args;
use crosstile::coord::TileCoord;
use crosstile::cross_tile::{IndexConfig, DEFAULT_KEY_RESOLUTION, DEFAULT_TILE_EXTENT};

use crate::error::CliError;

/// Key projection settings shared by commands.
#[derive(Debug, Clone, Args)]
pub struct KeyConfigArgs {
    /// Coordinate units per tile edge in the symbol data
    #[arg(long, default_value_t = DEFAULT_TILE_EXTENT)]
    pub extent: u32,

    /// Key grid cells per tile edge
    #[arg(long, default_value_t = DEFAULT_KEY_RESOLUTION)]
    pub resolution: u32,
}

impl KeyConfigArgs {
    /// Build a validated index configuration.
    pub fn to_config(&self) -> Result<IndexConfig, CliError> {
        let config = IndexConfig::new()
            .with_tile_extent(self.extent)
            .with_key_resolution(self.resolution);
        config.validate()?;
        Ok(config)
    }
}

/// Resolve a tile coordinate, treating zooms above `max_zoom` as over-zoomed
/// copies of the max-zoom tile at `row`/`col`.
pub fn resolve_tile(row: u32, col: u32, zoom: u8, max_zoom: u8) -> Result<TileCoord, CliError> {
    Ok(TileCoord::overzoomed(row, col, max_zoom, zoom)?)
}
