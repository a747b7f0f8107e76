// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the cover tree: node identifiers, roles, neighbors, and configuration.

/// Identifier of a point, and of the tree node built for it.
///
/// The id is the point's index in its [`PointSet`][crate::PointSet].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Create an id for the point at `index`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node ids are 32-bit; `Cover::new` rejects point sets that do not fit."
    )]
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Index of the point in its point set.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

/// What an inserted point became.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeRole {
    /// The root of the tree. Its level is always [`Cover::min_level`][crate::Cover::min_level].
    Root,
    /// A regular node attached below `parent` at `level`.
    Ordinary {
        /// Tree level; deeper nodes have larger levels.
        level: i32,
        /// The node covering this one.
        parent: NodeId,
    },
    /// The point coincides (distance zero) with an existing node and was not attached.
    Duplicate {
        /// The attached node it coincides with.
        of: NodeId,
    },
    /// Insertion ran out of its descent budget; the point was not attached.
    Orphan,
}

impl NodeRole {
    /// Whether the point is part of the tree (root or ordinary node).
    #[inline]
    pub const fn is_attached(self) -> bool {
        matches!(self, Self::Root | Self::Ordinary { .. })
    }
}

/// One result of a nearest-neighbor query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    /// The matched node.
    pub id: NodeId,
    /// Its distance from the query point.
    pub distance: f64,
}

/// Construction parameters for a [`Cover`][crate::Cover].
///
/// ```rust
/// use understory_cover_tree::CoverConfig;
///
/// let config = CoverConfig::default().with_base(1.5).with_max_descend(32);
/// assert_eq!(config.base, 1.5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoverConfig {
    /// Geometric decay factor; the covering radius of level `l` is `base^-l`.
    pub base: f64,
    /// Maximum number of levels an insertion may descend below the root.
    pub max_descend: u32,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            base: 2.0,
            max_descend: 64,
        }
    }
}

impl CoverConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the geometric base.
    ///
    /// Smaller bases give finer levels, so an insertion needs more steps to settle:
    /// a candidate at distance `d` stays live until `base / (base - 1) * base^-l`
    /// drops below `d`. Near one, that takes many levels per halving of distance,
    /// and with the default descent budget most points end up orphaned. Raise
    /// [`max_descend`][Self::max_descend] along with lowering the base; for a base
    /// of 1.05, a budget in the hundreds is a reasonable start.
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    /// Set the maximum descent depth of an insertion.
    pub fn with_max_descend(mut self, max_descend: u32) -> Self {
        self.max_descend = max_descend;
        self
    }
}
