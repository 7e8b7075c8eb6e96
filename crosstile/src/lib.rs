//! crosstile - Cross-tile symbol deduplication for tiled map renderers
//!
//! A tiled map places the same label independently in several tiles and at
//! several zoom levels. This library keeps an index of the symbols of every
//! loaded tile, picks the one copy of each label that should be shown, and
//! hands fade state between copies as tiles are loaded and evicted.
//!
//! - [`coord`]: quadtree tile coordinates
//! - [`symbol`]: symbol instances and their tile-owned container
//! - [`cross_tile`]: the deduplication index

pub mod coord;
pub mod cross_tile;
pub mod symbol;

pub use coord::TileCoord;
pub use cross_tile::{CrossTileSymbolIndex, IndexConfig, SymbolIndexError};
pub use symbol::{Anchor, DuplicateState, OpacityState, SymbolInstance, TileSymbols};
