//! Error types for the cross-tile symbol index.

use thiserror::Error;

use crate::coord::{CoordError, TileCoord};

/// Result type for index operations.
pub type SymbolIndexResult<T> = Result<T, SymbolIndexError>;

/// Caller protocol violations reported by the index.
///
/// All of these are detected before the index is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolIndexError {
    /// The tile was added twice without a remove in between.
    #[error("Tile {tile} is already registered in layer '{layer}'")]
    TileAlreadyRegistered { layer: String, tile: TileCoord },

    /// The tile (or its layer) is not registered.
    #[error("Tile {tile} is not registered in layer '{layer}'")]
    TileNotRegistered { layer: String, tile: TileCoord },

    /// The tile coordinate was built by hand with a zoom above
    /// [`MAX_ZOOM`](crate::coord::MAX_ZOOM).
    #[error("Invalid tile in layer '{layer}': {source}")]
    InvalidTile { layer: String, source: CoordError },

    /// Invalid index configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
