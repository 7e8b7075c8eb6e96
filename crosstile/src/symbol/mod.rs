//! Symbol instances and their tile-owned container.
//!
//! The tile/placement subsystem owns each tile's symbols in a [`TileSymbols`]
//! container. The cross-tile index keeps only weak handles into those
//! containers, so a tile must be removed from the index before its container
//! is dropped.
//!
//! # Example
//!
//! ```
//! use crosstile::symbol::{Anchor, SymbolInstance, TileSymbols};
//!
//! let symbols = TileSymbols::new(vec![
//!     SymbolInstance::new(Anchor::new(100.0, 200.0), "Main St"),
//! ]);
//! assert_eq!(symbols.len(), 1);
//! ```

mod instance;

pub use instance::{Anchor, DuplicateState, OpacityState, SymbolInstance};

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};

/// Shared, tile-owned list of symbol instances.
///
/// Cloning shares the same container.
#[derive(Debug, Clone, Default)]
pub struct TileSymbols {
    inner: Arc<Mutex<Vec<SymbolInstance>>>,
}

impl TileSymbols {
    pub fn new(instances: Vec<SymbolInstance>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(instances)),
        }
    }

    /// Lock the container for reading or writing.
    pub fn lock(&self) -> MutexGuard<'_, Vec<SymbolInstance>> {
        self.inner.lock()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the current instances.
    pub fn snapshot(&self) -> Vec<SymbolInstance> {
        self.inner.lock().clone()
    }

    pub(crate) fn downgrade(&self) -> SymbolHandle {
        SymbolHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl From<Vec<SymbolInstance>> for TileSymbols {
    fn from(instances: Vec<SymbolInstance>) -> Self {
        Self::new(instances)
    }
}

/// Non-owning handle to a [`TileSymbols`] container.
#[derive(Debug, Clone)]
pub(crate) struct SymbolHandle {
    inner: Weak<Mutex<Vec<SymbolInstance>>>,
}

impl SymbolHandle {
    /// Re-acquire the container if the tile still holds it.
    pub(crate) fn upgrade(&self) -> Option<Arc<Mutex<Vec<SymbolInstance>>>> {
        self.inner.upgrade()
    }

    pub(crate) fn ptr_eq(&self, other: &SymbolHandle) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    #[cfg(test)]
    fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_container() {
        let a = TileSymbols::new(vec![SymbolInstance::new(Anchor::default(), "x")]);
        let b = a.clone();
        b.lock()[0].duplicate = DuplicateState::Suppressed;
        assert_eq!(a.lock()[0].duplicate, DuplicateState::Suppressed);
    }

    #[test]
    fn test_handle_dies_with_container() {
        let symbols = TileSymbols::new(Vec::new());
        let handle = symbols.downgrade();
        assert!(handle.is_alive());
        assert!(handle.upgrade().is_some());

        drop(symbols);
        assert!(!handle.is_alive());
        assert!(handle.upgrade().is_none());
    }

    #[test]
    fn test_handles_of_same_container_are_equal() {
        let symbols = TileSymbols::new(Vec::new());
        let other = TileSymbols::new(Vec::new());
        assert!(symbols.downgrade().ptr_eq(&symbols.clone().downgrade()));
        assert!(!symbols.downgrade().ptr_eq(&other.downgrade()));
    }
}
