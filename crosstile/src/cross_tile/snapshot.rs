//! Point-in-time view of the index for diagnostics.

use serde::Serialize;

use crate::symbol::DuplicateState;

/// Counts for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayerSnapshot {
    pub layer_id: String,
    /// Registered tiles.
    pub tiles: usize,
    /// Zoom levels with registered tiles, ascending.
    pub zoom_levels: Vec<u8>,
    /// Symbol instances across all live tile containers.
    pub symbols: usize,
    pub unevaluated: usize,
    pub authoritative: usize,
    pub suppressed: usize,
    /// Registered tiles whose symbol container has been dropped.
    pub dead_tiles: usize,
}

impl LayerSnapshot {
    pub fn new(layer_id: impl Into<String>) -> Self {
        Self {
            layer_id: layer_id.into(),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, state: DuplicateState) {
        self.symbols += 1;
        match state {
            DuplicateState::Unevaluated => self.unevaluated += 1,
            DuplicateState::Authoritative => self.authoritative += 1,
            DuplicateState::Suppressed => self.suppressed += 1,
        }
    }
}

/// Counts for every layer, ordered by layer id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexSnapshot {
    pub layers: Vec<LayerSnapshot>,
}

impl IndexSnapshot {
    pub fn layer(&self, layer_id: &str) -> Option<&LayerSnapshot> {
        self.layers.iter().find(|l| l.layer_id == layer_id)
    }

    pub fn total_tiles(&self) -> usize {
        self.layers.iter().map(|l| l.tiles).sum()
    }

    pub fn total_symbols(&self) -> usize {
        self.layers.iter().map(|l| l.symbols).sum()
    }

    pub fn total_suppressed(&self) -> usize {
        self.layers.iter().map(|l| l.suppressed).sum()
    }
}
