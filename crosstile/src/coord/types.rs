//! Tile coordinate types.

use std::fmt;

use thiserror::Error;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level.
///
/// Bounded so that [`TileCoord::id`] (`(2^z * row + col) * 32 + z`) fits in a `u64`.
pub const MAX_ZOOM: u8 = 24;

/// Errors produced when constructing tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Zoom level above [`MAX_ZOOM`].
    #[error("Invalid zoom level: {0} (max: {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Row or column outside the `2^zoom` grid.
    #[error("Tile {row}_{col} is outside the grid at zoom {zoom}")]
    OutOfRange { row: u32, col: u32, zoom: u8 },
}

/// A quadtree tile coordinate.
///
/// `col` is the x axis (0 = west) and `row` the y axis (0 = north).
///
/// # Over-zoomed tiles
///
/// A tile above its source's max native zoom is an over-scaled copy of the
/// max-zoom tile. Its `row`/`col` stay those of that max-zoom tile; only
/// `zoom` grows. [`TileCoord::parent`] and [`TileCoord::is_child_of`] take the
/// source max zoom so they can tell the two cases apart.
///
/// Build coordinates with [`TileCoord::new`] or [`TileCoord::overzoomed`]. A
/// struct literal skips validation, and [`TileCoord::id`] is only defined for
/// `zoom <= MAX_ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Tile row (Y coordinate, 0 = north)
    pub row: u32,
    /// Tile column (X coordinate, 0 = west)
    pub col: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Create a validated tile coordinate.
    pub fn new(row: u32, col: u32, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let dim = 1u64 << zoom;
        if row as u64 >= dim || col as u64 >= dim {
            return Err(CoordError::OutOfRange { row, col, zoom });
        }
        Ok(Self { row, col, zoom })
    }

    /// Create an over-zoomed coordinate: the `max_zoom` tile at `row`/`col`
    /// displayed at `zoom`.
    pub fn overzoomed(row: u32, col: u32, max_zoom: u8, zoom: u8) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let canonical = Self::new(row, col, max_zoom.min(zoom))?;
        Ok(Self {
            zoom,
            ..canonical
        })
    }

    /// Stable identity, unique per `(row, col, zoom)`.
    #[inline]
    pub fn id(&self) -> u64 {
        let dim = 1u64 << self.zoom;
        (dim * self.row as u64 + self.col as u64) * 32 + self.zoom as u64
    }

    /// The parent tile one zoom level up.
    ///
    /// Over-zoomed tiles (zoom above `max_zoom`) keep their row/col.
    /// Returns `None` at zoom 0.
    pub fn parent(&self, max_zoom: u8) -> Option<TileCoord> {
        if self.zoom == 0 {
            return None;
        }
        if self.zoom > max_zoom {
            return Some(TileCoord {
                zoom: self.zoom - 1,
                ..*self
            });
        }
        Some(TileCoord {
            row: self.row / 2,
            col: self.col / 2,
            zoom: self.zoom - 1,
        })
    }

    /// The ancestor of this tile at `zoom`, or `None` if `zoom` is not lower.
    pub fn ancestor_at(&self, zoom: u8, max_zoom: u8) -> Option<TileCoord> {
        if zoom >= self.zoom {
            return None;
        }
        let mut current = *self;
        while current.zoom > zoom {
            current = current.parent(max_zoom)?;
        }
        Some(current)
    }

    /// Whether `self` is a strict quadtree descendant of `other`.
    #[inline]
    pub fn is_child_of(&self, other: &TileCoord, max_zoom: u8) -> bool {
        self.ancestor_at(other.zoom, max_zoom) == Some(*other)
    }

    /// Ancestors from `zoom - 1` down to zoom 0.
    pub fn ancestors(&self, max_zoom: u8) -> Ancestors {
        Ancestors {
            next: self.parent(max_zoom),
            max_zoom,
        }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Iterator over a tile's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<TileCoord>,
    max_zoom: u8,
}

impl Iterator for Ancestors {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent(self.max_zoom);
        Some(current)
    }
}
