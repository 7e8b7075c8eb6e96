//! Composite position + content keys for matching symbols across tiles.
//!
//! A symbol's anchor is converted to a world-relative position, scaled to the
//! target zoom, and quantized to the key grid. Two copies of a label match
//! when they land in the same cell and carry the same content key.

use std::fmt;
use std::sync::Arc;

use crate::coord::TileCoord;
use crate::symbol::SymbolInstance;

use super::config::IndexConfig;

/// Quantized world position plus content identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolKey {
    pub x: i64,
    pub y: i64,
    pub content: Arc<str>,
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.x, self.y, self.content)
    }
}

/// Projects symbol anchors onto the key grid of a target zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyProjector {
    extent: f64,
    rounding_factor: f64,
    source_max_zoom: u8,
}

impl KeyProjector {
    pub fn new(config: &IndexConfig, source_max_zoom: u8) -> Self {
        Self {
            extent: config.tile_extent as f64,
            rounding_factor: config.rounding_factor(),
            source_max_zoom,
        }
    }

    pub fn source_max_zoom(&self) -> u8 {
        self.source_max_zoom
    }

    /// Scale from anchor units at `tile_zoom` to key cells at `target_zoom`.
    ///
    /// Both zooms are clamped at the source max zoom: over-zoomed tiles share
    /// the max-zoom tile's coordinate space.
    #[inline]
    pub fn scale(&self, tile_zoom: u8, target_zoom: u8) -> f64 {
        let target = self.source_max_zoom.min(target_zoom) as i32;
        let tile = self.source_max_zoom.min(tile_zoom) as i32;
        2f64.powi(target - tile) * self.rounding_factor
    }

    /// Key of `instance` (anchored in `coord`) projected onto `target_zoom`.
    pub fn key(&self, instance: &SymbolInstance, coord: &TileCoord, target_zoom: u8) -> SymbolKey {
        let scale = self.scale(coord.zoom, target_zoom);
        let anchor = instance.anchor;
        let x = ((coord.col as f64 * self.extent + anchor.x) * scale).floor() as i64;
        let y = ((coord.row as f64 * self.extent + anchor.y) * scale).floor() as i64;
        SymbolKey {
            x,
            y,
            content: Arc::clone(&instance.key),
        }
    }
}
