//! Top-level index: one pyramid per symbol layer.

use std::collections::HashMap;

use tracing::debug;

use crate::coord::TileCoord;
use crate::symbol::TileSymbols;

use super::config::IndexConfig;
use super::error::{SymbolIndexError, SymbolIndexResult};
use super::layer_index::CrossTileSymbolLayerIndex;
use super::snapshot::IndexSnapshot;

/// Cross-tile symbol index for every symbol layer.
///
/// Duplicates are only resolved within a layer; layers never affect each
/// other. Layer pyramids are created on first use.
#[derive(Debug, Default)]
pub struct CrossTileSymbolIndex {
    config: IndexConfig,
    layer_indexes: HashMap<String, CrossTileSymbolLayerIndex>,
}

impl CrossTileSymbolIndex {
    /// Create an index with the default key configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with a custom key configuration.
    pub fn with_config(config: IndexConfig) -> SymbolIndexResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            layer_indexes: HashMap::new(),
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Register a loaded tile's symbols for `layer_id`.
    pub fn add_tile_layer(
        &mut self,
        layer_id: &str,
        coord: TileCoord,
        source_max_zoom: u8,
        symbols: &TileSymbols,
    ) -> SymbolIndexResult<()> {
        let config = self.config;
        let layer_index = self
            .layer_indexes
            .entry(layer_id.to_string())
            .or_insert_with(|| {
                debug!(layer = layer_id, "Creating layer index");
                CrossTileSymbolLayerIndex::new(layer_id, config)
            });
        layer_index.add_tile(coord, source_max_zoom, symbols)
    }

    /// Unregister an evicted tile from `layer_id`.
    pub fn remove_tile_layer(
        &mut self,
        layer_id: &str,
        coord: TileCoord,
        source_max_zoom: u8,
    ) -> SymbolIndexResult<()> {
        match self.layer_indexes.get_mut(layer_id) {
            Some(layer_index) => layer_index.remove_tile(coord, source_max_zoom),
            None => Err(SymbolIndexError::TileNotRegistered {
                layer: layer_id.to_string(),
                tile: coord,
            }),
        }
    }

    pub fn layer(&self, layer_id: &str) -> Option<&CrossTileSymbolLayerIndex> {
        self.layer_indexes.get(layer_id)
    }

    /// Known layer ids, sorted.
    pub fn layer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.layer_indexes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains_tile(&self, layer_id: &str, coord: &TileCoord) -> bool {
        self.layer(layer_id)
            .is_some_and(|layer_index| layer_index.contains_tile(coord))
    }

    /// Point-in-time counts for every layer.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            layers: self
                .layer_ids()
                .into_iter()
                .filter_map(|id| self.layer(id))
                .map(CrossTileSymbolLayerIndex::snapshot)
                .collect(),
        }
    }
}
