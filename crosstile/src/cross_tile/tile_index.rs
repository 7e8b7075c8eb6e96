//! Per-tile symbol index.

use std::collections::HashMap;

use tracing::trace;

use crate::coord::TileCoord;
use crate::symbol::{DuplicateState, SymbolHandle, SymbolInstance, TileSymbols};

use super::key::{KeyProjector, SymbolKey};

/// Symbols of one tile in one layer, keyed by position + content.
///
/// Holds a weak handle to the tile's [`TileSymbols`] and the slot of each
/// indexed instance. When two instances produce the same key the later one
/// wins.
#[derive(Debug)]
pub struct TileLayerIndex {
    coord: TileCoord,
    projector: KeyProjector,
    symbols: SymbolHandle,
    slots: HashMap<SymbolKey, usize>,
    /// Indexed slots in ascending order, for deterministic traversal.
    ordered_slots: Vec<usize>,
}

impl TileLayerIndex {
    /// Index `symbols` as placed in `coord`, resetting every instance to
    /// [`DuplicateState::Unevaluated`].
    pub fn new(coord: TileCoord, projector: KeyProjector, symbols: &TileSymbols) -> Self {
        let mut instances = symbols.lock();
        let mut slots = HashMap::with_capacity(instances.len());

        for (slot, instance) in instances.iter_mut().enumerate() {
            let key = projector.key(instance, &coord, coord.zoom);
            if let Some(previous) = slots.insert(key, slot) {
                trace!(tile = %coord, previous, slot, "Symbol key collision, keeping later instance");
            }
            instance.duplicate = DuplicateState::Unevaluated;
        }

        let mut ordered_slots: Vec<usize> = slots.values().copied().collect();
        ordered_slots.sort_unstable();

        Self {
            coord,
            projector,
            symbols: symbols.downgrade(),
            slots,
            ordered_slots,
        }
    }

    pub fn coord(&self) -> &TileCoord {
        &self.coord
    }

    pub fn source_max_zoom(&self) -> u8 {
        self.projector.source_max_zoom()
    }

    /// Number of indexed (distinct-key) symbols.
    pub fn len(&self) -> usize {
        self.ordered_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_slots.is_empty()
    }

    /// Slot of the instance in this tile matching `instance` from `coord`.
    pub fn get(&self, instance: &SymbolInstance, coord: &TileCoord) -> Option<usize> {
        let key = self.projector.key(instance, coord, self.coord.zoom);
        self.slots.get(&key).copied()
    }

    pub(crate) fn ordered_slots(&self) -> &[usize] {
        &self.ordered_slots
    }

    pub(crate) fn handle(&self) -> &SymbolHandle {
        &self.symbols
    }
}
