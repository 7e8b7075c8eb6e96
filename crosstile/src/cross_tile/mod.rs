//! Cross-tile symbol deduplication.
//!
//! Tracks every placed symbol across all loaded tiles and zoom levels of a
//! layer, decides which copy of a label is shown, and moves fade state between
//! copies as tiles load and unload.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  CrossTileSymbolIndex                     │
//! │   layer id ──► CrossTileSymbolLayerIndex (pyramid)        │
//! │                  zoom ──► tile id ──► TileLayerIndex      │
//! │                                         SymbolKey ──► slot│
//! └──────────────────────────────────────────────────────────┘
//!                              │ weak handles
//!                              ▼
//!                 TileSymbols (owned by the tile)
//! ```
//!
//! # Precedence Rules
//!
//! 1. The finest loaded copy of a label is authoritative, whatever the load
//!    order.
//! 2. A newly authoritative copy continues the fade of the copy it replaces.
//! 3. Removing a finer tile hands visibility back to the nearest loaded
//!    coarser copy.
//!
//! # Example
//!
//! ```
//! use crosstile::coord::TileCoord;
//! use crosstile::cross_tile::CrossTileSymbolIndex;
//! use crosstile::symbol::{Anchor, DuplicateState, SymbolInstance, TileSymbols};
//!
//! let mut index = CrossTileSymbolIndex::new();
//!
//! let parent = TileSymbols::new(vec![SymbolInstance::new(Anchor::new(1536.0, 1536.0), "Main St")]);
//! let child = TileSymbols::new(vec![SymbolInstance::new(Anchor::new(4096.0, 4096.0), "Main St")]);
//!
//! index.add_tile_layer("road-label", TileCoord::new(0, 0, 1)?, 14, &parent)?;
//! index.add_tile_layer("road-label", TileCoord::new(1, 1, 4)?, 14, &child)?;
//!
//! assert_eq!(parent.lock()[0].duplicate, DuplicateState::Suppressed);
//! assert_eq!(child.lock()[0].duplicate, DuplicateState::Authoritative);
//!
//! index.remove_tile_layer("road-label", TileCoord::new(1, 1, 4)?, 14)?;
//! assert_eq!(parent.lock()[0].duplicate, DuplicateState::Authoritative);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod index;
mod key;
mod layer_index;
mod snapshot;
mod tile_index;


pub use config::{IndexConfig, DEFAULT_KEY_RESOLUTION, DEFAULT_TILE_EXTENT};
pub use error::{SymbolIndexError, SymbolIndexResult};
pub use index::CrossTileSymbolIndex;
pub use key::{KeyProjector, SymbolKey};
pub use layer_index::CrossTileSymbolLayerIndex;
pub use snapshot::{IndexSnapshot, LayerSnapshot};
pub use tile_index::TileLayerIndex;
