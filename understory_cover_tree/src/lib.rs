// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_cover_tree --heading-base-level=0

//! Understory Cover Tree: an incremental cover tree over an arbitrary metric space.
//!
//! A cover tree indexes a fixed [`PointSet`] so that nearest-neighbor and
//! within-radius queries touch only a small part of the data.
//!
//! - Insert points one at a time with [`Cover::insert`]; the root's radius grows as farther points arrive.
//! - Points that coincide with an attached node are recorded as duplicates, not attached.
//! - Insertion is bounded by a descent budget; points that exhaust it become orphans.
//! - Query the `k` nearest nodes with [`Cover::find_nearest`] or every node within a radius with [`Cover::find_within`].
//! - Verify a tree with the invariant checkers and brute-force oracles (`check_*` on [`Cover`]).
//!
//! The crate owns no point storage. A [`PointSet`] answers distance questions by index;
//! adapters are provided for a flat row-major `f64` buffer ([`FlatPoints`]) and for
//! `kurbo::Point` slices.
//!
//! ## Levels
//!
//! Levels grow toward the leaves. The root lives at [`Cover::min_level`], which is never
//! positive and only decreases. A node at level `l` has covering radius `base^-l`, and a
//! node is always within the covering radius of the level above its own from its parent.
//!
//! ## Features
//!
//! - `std` *(default)*: use the standard library for floating-point math.
//! - `libm`: use `libm` for floating-point math in `no_std` builds.
//!
//! # Example
//!
//! ```rust
//! use understory_cover_tree::{Cover, CoverConfig, FlatPoints, Levels, NodeId, NodeRole};
//!
//! // Five 2D points, one of them repeated.
//! let coords = [0.0, 0.0, 1.0, 0.0, 5.0, 0.0, 5.0, 1.0, 1.0, 0.0];
//! let points = FlatPoints::new(&coords, 2);
//!
//! let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
//! cover.insert_all();
//! assert_eq!(cover.cover_number(), 4);
//! assert_eq!(cover.role(NodeId::new(4)), Some(NodeRole::Duplicate { of: NodeId::new(1) }));
//!
//! let query = [5.0, 0.6];
//! let nearest = cover.find_nearest(&query[..], 2);
//! assert_eq!(nearest[0].id, NodeId::new(3));
//! assert!(cover.check_find_nearest(&query[..], 2, &nearest).is_ok());
//!
//! assert!(cover.check_children().is_ok());
//! assert!(cover.check_levels(&Levels::new(&cover)).is_ok());
//! ```

#![no_std]

extern crate alloc;

mod cache;
mod check;
mod child_lists;
mod cover;
mod descend;
mod error;
mod levels;
mod points;
mod types;

pub use cache::{CacheStats, SparseCache};
pub use child_lists::{ChildLists, Children};
pub use cover::Cover;
pub use descend::{DescendList, Placement, TraversalStats};
pub use error::{CoverError, Violation};
pub use levels::Levels;
pub use points::{FlatPoints, PointSet};
pub use types::{CoverConfig, Neighbor, NodeId, NodeRole};
