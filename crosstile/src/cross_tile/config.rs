//! Configuration for symbol key projection.

use serde::{Deserialize, Serialize};

use super::error::SymbolIndexError;

/// Default number of coordinate units per tile edge in vector tile data.
pub const DEFAULT_TILE_EXTENT: u32 = 8192;

/// Default key grid resolution per tile edge.
///
/// Anchors are quantized to this many cells per tile before matching, so
/// copies of a label from tiles with different internal precision still land
/// in the same cell.
pub const DEFAULT_KEY_RESOLUTION: u32 = 512;

/// Configuration of the cross-tile symbol index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Coordinate units per tile edge (anchor space).
    ///
    /// Default: 8192.
    pub tile_extent: u32,

    /// Key cells per tile edge.
    ///
    /// Default: 512.
    pub key_resolution: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            tile_extent: DEFAULT_TILE_EXTENT,
            key_resolution: DEFAULT_KEY_RESOLUTION,
        }
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tile extent.
    pub fn with_tile_extent(mut self, extent: u32) -> Self {
        self.tile_extent = extent;
        self
    }

    /// Set the key resolution.
    pub fn with_key_resolution(mut self, resolution: u32) -> Self {
        self.key_resolution = resolution;
        self
    }

    /// Factor from anchor units to key cells.
    #[inline]
    pub fn rounding_factor(&self) -> f64 {
        self.key_resolution as f64 / self.tile_extent as f64
    }

    /// Reject zero extent or resolution.
    pub fn validate(&self) -> Result<(), SymbolIndexError> {
        if self.tile_extent == 0 {
            return Err(SymbolIndexError::InvalidConfig(
                "tile_extent must be greater than zero".to_string(),
            ));
        }
        if self.key_resolution == 0 {
            return Err(SymbolIndexError::InvalidConfig(
                "key_resolution must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
