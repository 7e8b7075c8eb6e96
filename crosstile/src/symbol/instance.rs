//! Symbol instance data types.
//!
//! A symbol instance is owned by its tile's placement data. The cross-tile
//! index only reads `anchor`/`key` and writes the duplicate state and the two
//! opacity states.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Position of a symbol within its tile, in tile extent units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fade animation progress of a symbol's text or icon.
///
/// This is a value type: transferring it between instances copies it, so two
/// instances never share one animation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OpacityState {
    /// Current opacity (0.0 to 1.0)
    pub opacity: f32,
    /// Whether the symbol was placed (fading in) or not (fading out)
    pub placed: bool,
}

impl OpacityState {
    pub fn new(opacity: f32, placed: bool) -> Self {
        Self { opacity, placed }
    }
}

/// Cross-tile duplicate status of a symbol instance.
///
/// # State Machine
///
/// ```text
/// Unevaluated --[blocks a coarser copy]----------> Authoritative
/// Unevaluated --[blocked by a finer copy]--------> Suppressed
/// Authoritative --[blocked by a finer copy]------> Suppressed
/// Suppressed --[finer blocker removed]-----------> Authoritative
/// Authoritative --[hands visibility back]--------> Suppressed
/// ```
///
/// Registering a tile resets all of its instances to `Unevaluated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateState {
    /// No loaded tile shares this label yet.
    #[default]
    Unevaluated,
    /// This copy is the one shown.
    Authoritative,
    /// Hidden in favor of another copy.
    Suppressed,
}

impl DuplicateState {
    /// Whether this copy is hidden.
    #[inline]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DuplicateState::Suppressed)
    }
}

impl fmt::Display for DuplicateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuplicateState::Unevaluated => "unevaluated",
            DuplicateState::Authoritative => "authoritative",
            DuplicateState::Suppressed => "suppressed",
        };
        f.write_str(s)
    }
}

/// A placed label or icon.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInstance {
    /// Position within the owning tile.
    pub anchor: Anchor,
    /// Content identity (e.g. the label text), independent of position.
    pub key: Arc<str>,
    /// Cross-tile duplicate status, maintained by the index.
    pub duplicate: DuplicateState,
    /// Text fade state.
    pub text_opacity: OpacityState,
    /// Icon fade state.
    pub icon_opacity: OpacityState,
}

impl SymbolInstance {
    /// Create an unevaluated instance with zeroed opacity.
    pub fn new(anchor: Anchor, key: impl Into<Arc<str>>) -> Self {
        Self {
            anchor,
            key: key.into(),
            duplicate: DuplicateState::Unevaluated,
            text_opacity: OpacityState::default(),
            icon_opacity: OpacityState::default(),
        }
    }

    /// Set both opacity states.
    pub fn with_opacity(mut self, text: OpacityState, icon: OpacityState) -> Self {
        self.text_opacity = text;
        self.icon_opacity = icon;
        self
    }

    /// Become the authoritative copy, continuing `other`'s fade.
    pub(crate) fn take_over_from(&mut self, other: &SymbolInstance) {
        self.duplicate = DuplicateState::Authoritative;
        self.copy_opacity_from(other);
    }

    /// Hide this copy.
    pub(crate) fn suppress(&mut self) {
        self.duplicate = DuplicateState::Suppressed;
    }

    pub(crate) fn copy_opacity_from(&mut self, other: &SymbolInstance) {
        self.text_opacity = other.text_opacity;
        self.icon_opacity = other.icon_opacity;
    }
}
