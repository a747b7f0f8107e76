// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction errors and structural violations reported by the checkers.

use thiserror::Error;

use crate::types::NodeId;

/// Errors returned when a [`Cover`][crate::Cover] cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CoverError {
    /// The geometric base must be finite and strictly greater than one.
    #[error("invalid base {0}: must be finite and greater than 1")]
    InvalidBase(f64),

    /// The deepest covering radius reachable within `max_descend` levels is not representable.
    #[error("max_descend {max_descend} underflows the covering radius for base {base}")]
    DescendTooDeep {
        /// Configured base.
        base: f64,
        /// Configured maximum descent.
        max_descend: u32,
    },

    /// The base is so close to one that the levels needed to span the float range
    /// do not fit in an `i32`.
    #[error("base {base} needs more levels than fit in i32 with max_descend {max_descend}")]
    LevelOverflow {
        /// Configured base.
        base: f64,
        /// Configured maximum descent.
        max_descend: u32,
    },

    /// The point set holds more points than a [`NodeId`] can address.
    #[error("point set of {0} points exceeds the node id range")]
    TooManyPoints(usize),
}

/// A broken relationship found by one of the invariant checkers.
///
/// Checkers stop at the first violation. A tree built only through
/// [`Cover::insert`][crate::Cover::insert] never reports one.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum Violation {
    /// A node lies farther from its parent than the parent's covering radius.
    #[error("node {node:?} is {distance} from parent {parent:?}, bound is {bound}")]
    Covering {
        /// Offending node.
        node: NodeId,
        /// Its recorded parent.
        parent: NodeId,
        /// Measured distance to the parent.
        distance: f64,
        /// Covering radius at the parent's level.
        bound: f64,
    },

    /// A node's level is not strictly deeper than its parent's.
    #[error("node {node:?} at level {level} is not below parent {parent:?} at level {parent_level}")]
    LevelOrder {
        /// Offending node.
        node: NodeId,
        /// Its recorded parent.
        parent: NodeId,
        /// Level of the node.
        level: i32,
        /// Level of the parent.
        parent_level: i32,
    },

    /// A node is listed among the children of a node that is not its parent.
    #[error("node {child:?} is listed under {listed_under:?} but its parent is {parent:?}")]
    ChildParentMismatch {
        /// Listed child.
        child: NodeId,
        /// Node whose child list contains it.
        listed_under: NodeId,
        /// Recorded parent, if any.
        parent: Option<NodeId>,
    },

    /// A node appears in more than one child list, or twice in the same list.
    #[error("node {child:?} is listed under both {first:?} and {second:?}")]
    MultipleParents {
        /// Repeated child.
        child: NodeId,
        /// First list containing it.
        first: NodeId,
        /// Second list containing it.
        second: NodeId,
    },

    /// An ordinary node is missing from its parent's child list.
    #[error("node {child:?} is not listed under its parent {parent:?}")]
    MissingChild {
        /// Unlisted child.
        child: NodeId,
        /// Its recorded parent.
        parent: NodeId,
    },

    /// A level bucket disagrees with the live levels.
    #[error("level {level}: expected {expected} entries, found {actual}")]
    LevelBucket {
        /// Level of the bucket.
        level: i32,
        /// Count derived from the live tree.
        expected: usize,
        /// Count stored in the snapshot.
        actual: usize,
    },

    /// A node is filed in the wrong level bucket.
    #[error("node {node:?} is filed at level {filed}, but lives at level {actual:?}")]
    MisfiledNode {
        /// Offending node.
        node: NodeId,
        /// Bucket it was found in.
        filed: i32,
        /// Its live level (`None` when it is not attached).
        actual: Option<i32>,
    },

    /// The `rank`-th nearest distance differs from the brute-force scan.
    #[error("rank {rank}: expected distance {expected:?}, found {actual:?}")]
    NearestMismatch {
        /// Zero-based rank in the neighbor list.
        rank: usize,
        /// Brute-force distance at that rank.
        expected: Option<f64>,
        /// Reported distance at that rank.
        actual: Option<f64>,
    },

    /// A reported neighbor's distance is not its true distance, or it is not in the tree.
    #[error("neighbor {node:?} reported at {reported}, actual distance is {actual:?}")]
    WrongNeighbor {
        /// Reported node.
        node: NodeId,
        /// Reported distance.
        reported: f64,
        /// Recomputed distance, `None` when the node is not attached.
        actual: Option<f64>,
    },

    /// A node within the query radius was not reported.
    #[error("node {0:?} is within range but was not reported")]
    WithinMissing(NodeId),

    /// A reported node is outside the query radius, deeper than the level cut, or reported twice.
    #[error("node {0:?} was reported but does not belong to the range result")]
    WithinSpurious(NodeId),
}
