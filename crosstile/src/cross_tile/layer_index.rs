//! Per-layer pyramid index and the block/unblock protocol.
//!
//! # Protocol
//!
//! ```text
//! add_tile(T):
//!   for each loaded descendant D of T (highest zoom first):  block(D → T)
//!   for each loaded ancestor A of T (nearest first):         block(T → A)
//!
//! remove_tile(T):
//!   for each loaded ancestor A of T (nearest first):         unblock(T → A)
//! ```
//!
//! The finest loaded copy of a label always wins, whatever order tiles load
//! in, and visibility moves between copies together with their fade state.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::coord::{CoordError, TileCoord, MAX_ZOOM};
use crate::symbol::{DuplicateState, SymbolInstance, TileSymbols};

use super::config::IndexConfig;
use super::error::{SymbolIndexError, SymbolIndexResult};
use super::key::KeyProjector;
use super::snapshot::LayerSnapshot;
use super::tile_index::TileLayerIndex;

type SharedInstances = Arc<Mutex<Vec<SymbolInstance>>>;

/// All loaded tiles of one symbol layer, by zoom then tile id.
#[derive(Debug)]
pub struct CrossTileSymbolLayerIndex {
    layer_id: String,
    config: IndexConfig,
    indexes: BTreeMap<u8, BTreeMap<u64, TileLayerIndex>>,
}

impl CrossTileSymbolLayerIndex {
    pub fn new(layer_id: impl Into<String>, config: IndexConfig) -> Self {
        Self {
            layer_id: layer_id.into(),
            config,
            indexes: BTreeMap::new(),
        }
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Register a loaded tile's symbols and resolve duplicates against the
    /// loaded descendants and ancestors.
    pub fn add_tile(
        &mut self,
        coord: TileCoord,
        source_max_zoom: u8,
        symbols: &TileSymbols,
    ) -> SymbolIndexResult<()> {
        if coord.zoom > MAX_ZOOM {
            return Err(SymbolIndexError::InvalidTile {
                layer: self.layer_id.clone(),
                source: CoordError::InvalidZoom(coord.zoom),
            });
        }
        if self.contains_tile(&coord) {
            return Err(SymbolIndexError::TileAlreadyRegistered {
                layer: self.layer_id.clone(),
                tile: coord,
            });
        }

        let projector = KeyProjector::new(&self.config, source_max_zoom);
        let tile_index = TileLayerIndex::new(coord, projector, symbols);
        let mut blocked = 0;

        // Higher-res child tiles block duplicate labels in this tile
        for (_, zoom_indexes) in self.indexes.range((Excluded(coord.zoom), Unbounded)).rev() {
            for child_index in zoom_indexes.values() {
                if child_index.coord().is_child_of(&coord, source_max_zoom) {
                    blocked += Self::block_labels(child_index, &tile_index);
                }
            }
        }

        // This tile blocks duplicate labels in lower-res parent tiles
        for parent_index in self.loaded_ancestors(&coord, source_max_zoom) {
            blocked += Self::block_labels(&tile_index, parent_index);
        }

        debug!(
            layer = %self.layer_id,
            tile = %coord,
            symbols = tile_index.len(),
            blocked,
            "Registered tile symbols"
        );

        self.indexes
            .entry(coord.zoom)
            .or_default()
            .insert(coord.id(), tile_index);
        Ok(())
    }

    /// Unregister an evicted tile, handing visibility back to any loaded
    /// ancestor copies it was suppressing.
    pub fn remove_tile(&mut self, coord: TileCoord, source_max_zoom: u8) -> SymbolIndexResult<()> {
        let removed = self
            .indexes
            .get_mut(&coord.zoom)
            .and_then(|zoom_indexes| zoom_indexes.remove(&coord.id()))
            .ok_or_else(|| SymbolIndexError::TileNotRegistered {
                layer: self.layer_id.clone(),
                tile: coord,
            })?;

        if self
            .indexes
            .get(&coord.zoom)
            .is_some_and(|zoom_indexes| zoom_indexes.is_empty())
        {
            self.indexes.remove(&coord.zoom);
        }

        let mut unblocked = 0;
        for parent_index in self.loaded_ancestors(&coord, source_max_zoom) {
            unblocked += Self::unblock_labels(&removed, parent_index);
        }

        debug!(
            layer = %self.layer_id,
            tile = %coord,
            unblocked,
            "Removed tile symbols"
        );
        Ok(())
    }

    /// Let the finer `child_index` suppress matching labels in `parent_index`.
    ///
    /// Returns the number of parent labels suppressed.
    fn block_labels(child_index: &TileLayerIndex, parent_index: &TileLayerIndex) -> usize {
        let Some((child_symbols, parent_symbols)) = upgrade_pair(child_index, parent_index) else {
            return 0;
        };
        let mut child_symbols = child_symbols.lock();
        let mut parent_symbols = parent_symbols.lock();
        let mut blocked = 0;

        for &slot in child_index.ordered_slots() {
            let Some(symbol) = child_symbols.get_mut(slot) else {
                continue;
            };

            // Only non-duplicate labels can block other labels
            if symbol.duplicate.is_duplicate() {
                continue;
            }

            let Some(parent_slot) = parent_index.get(symbol, child_index.coord()) else {
                continue;
            };
            let Some(parent_symbol) = parent_symbols.get_mut(parent_slot) else {
                continue;
            };
            if parent_symbol.duplicate.is_duplicate() {
                continue;
            }

            parent_symbol.suppress();
            // An already authoritative child is on screen with its own fade
            if symbol.duplicate == DuplicateState::Unevaluated {
                symbol.take_over_from(parent_symbol);
            }
            blocked += 1;

            trace!(
                key = %symbol.key,
                child = %child_index.coord(),
                parent = %parent_index.coord(),
                "Label blocked by finer tile"
            );
        }

        blocked
    }

    /// Give suppressed labels in `parent_index` back their visibility from the
    /// departing `child_index`.
    ///
    /// # Panics
    ///
    /// If `child_index` is not at a higher zoom than `parent_index`. In debug
    /// builds, also if a matching parent label is already authoritative.
    fn unblock_labels(child_index: &TileLayerIndex, parent_index: &TileLayerIndex) -> usize {
        assert!(
            child_index.coord().zoom > parent_index.coord().zoom,
            "unblock_labels requires a finer child: child {} vs parent {}",
            child_index.coord(),
            parent_index.coord()
        );
        let Some((child_symbols, parent_symbols)) = upgrade_pair(child_index, parent_index) else {
            return 0;
        };
        let mut child_symbols = child_symbols.lock();
        let mut parent_symbols = parent_symbols.lock();
        let mut unblocked = 0;

        for &slot in child_index.ordered_slots() {
            let Some(symbol) = child_symbols.get_mut(slot) else {
                continue;
            };

            // Only authoritative labels were blocking other labels
            if symbol.duplicate != DuplicateState::Authoritative {
                continue;
            }

            let Some(parent_slot) = parent_index.get(symbol, child_index.coord()) else {
                continue;
            };
            let Some(parent_symbol) = parent_symbols.get_mut(parent_slot) else {
                continue;
            };
            debug_assert_ne!(
                parent_symbol.duplicate,
                DuplicateState::Authoritative,
                "label {} shown in both {} and {}",
                symbol.key,
                child_index.coord(),
                parent_index.coord()
            );

            parent_symbol.take_over_from(symbol);
            // Mark it duplicate so it doesn't unblock any other ancestor
            symbol.suppress();
            unblocked += 1;

            trace!(
                key = %symbol.key,
                child = %child_index.coord(),
                parent = %parent_index.coord(),
                "Label unblocked in coarser tile"
            );
        }

        unblocked
    }

    /// Loaded ancestors of `coord`, nearest first, down to the lowest loaded
    /// zoom.
    fn loaded_ancestors<'a>(
        &'a self,
        coord: &TileCoord,
        source_max_zoom: u8,
    ) -> impl Iterator<Item = &'a TileLayerIndex> + 'a {
        let min_zoom = self.min_zoom().unwrap_or(u8::MAX);
        coord
            .ancestors(source_max_zoom)
            .take_while(move |ancestor| ancestor.zoom >= min_zoom)
            .filter_map(move |ancestor| self.tile(&ancestor))
    }

    /// The per-tile index registered for `coord`.
    pub fn tile(&self, coord: &TileCoord) -> Option<&TileLayerIndex> {
        self.indexes.get(&coord.zoom)?.get(&coord.id())
    }

    pub fn contains_tile(&self, coord: &TileCoord) -> bool {
        self.tile(coord).is_some()
    }

    /// Number of registered tiles.
    pub fn tile_count(&self) -> usize {
        self.indexes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Zoom levels with at least one registered tile, ascending.
    pub fn zoom_levels(&self) -> Vec<u8> {
        self.indexes.keys().copied().collect()
    }

    pub fn min_zoom(&self) -> Option<u8> {
        self.indexes.keys().next().copied()
    }

    pub fn max_zoom(&self) -> Option<u8> {
        self.indexes.keys().next_back().copied()
    }

    /// Registered tiles, by ascending zoom then tile id.
    pub fn tiles(&self) -> impl Iterator<Item = &TileLayerIndex> {
        self.indexes.values().flat_map(BTreeMap::values)
    }

    /// Point-in-time counts for this layer.
    pub fn snapshot(&self) -> LayerSnapshot {
        let mut snapshot = LayerSnapshot::new(self.layer_id.clone());
        snapshot.tiles = self.tile_count();
        snapshot.zoom_levels = self.zoom_levels();

        for tile_index in self.tiles() {
            let Some(symbols) = tile_index.handle().upgrade() else {
                snapshot.dead_tiles += 1;
                continue;
            };
            for symbol in symbols.lock().iter() {
                snapshot.record(symbol.duplicate);
            }
        }
        snapshot
    }
}

/// Upgrade the containers of two tiles for a block/unblock pass.
///
/// # Panics
///
/// If both tiles share one container.
fn upgrade_pair(
    child_index: &TileLayerIndex,
    parent_index: &TileLayerIndex,
) -> Option<(SharedInstances, SharedInstances)> {
    assert!(
        !child_index.handle().ptr_eq(parent_index.handle()),
        "tiles {} and {} were registered with the same symbol container",
        child_index.coord(),
        parent_index.coord()
    );

    let child = child_index.handle().upgrade();
    let parent = parent_index.handle().upgrade();
    match (child, parent) {
        (Some(child), Some(parent)) => Some((child, parent)),
        (child, parent) => {
            warn!(
                child = %child_index.coord(),
                child_alive = child.is_some(),
                parent = %parent_index.coord(),
                parent_alive = parent.is_some(),
                "Symbol container dropped while its tile was still registered"
            );
            None
        }
    }
}
