//! Tile coordinate module
//!
//! Provides the quadtree tile coordinates consumed by the cross-tile symbol
//! index: stable identity, parent/ancestor walks clamped at a source's max
//! native zoom, and descendant tests.

mod types;

pub use types::{Ancestors, CoordError, TileCoord, MAX_ZOOM, MIN_ZOOM};
