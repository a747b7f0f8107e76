// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The level-by-level descent shared by insertion and queries.
//!
//! A descent keeps the set of candidate nodes present at the current level.
//! Each step moves one level deeper: every candidate stays (a node is present
//! at all levels below its own), its children living exactly one level deeper
//! join, and candidates that provably cannot matter are pruned.
//!
//! A node at level `l` has all descendants it has not yet contributed within
//! `lambda * base^-l`, where `lambda = base / (base - 1)` sums the geometric
//! series of child radii. Insertion and both queries prune against that bound.

use alloc::vec::Vec;
use core::mem;

use smallvec::SmallVec;

use crate::cache::{CacheStats, SparseCache};
use crate::cover::Cover;
use crate::points::PointSet;
use crate::types::{Neighbor, NodeId};

/// Where an insertion descent ended.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Placement {
    /// The point coincides with this attached node.
    Duplicate(NodeId),
    /// The point belongs below `parent`, at `level`.
    Attach {
        /// Closest covering candidate.
        parent: NodeId,
        /// Level for the new node, one below the level `parent` was found at.
        level: i32,
    },
    /// The descent budget ran out before the candidate set emptied.
    Exhausted,
}

/// Cache call counters of one traversal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Distance cache: one `set` per metric evaluation.
    pub distances: CacheStats,
    /// Child cursor cache.
    pub child_cursors: CacheStats,
}

/// Candidate set and caches of one descent.
///
/// A [`Cover`] owns one list and reuses it for every insertion and query. Read-only
/// queries can also run on a separately owned list through
/// [`Cover::find_nearest_with`] and [`Cover::find_within_with`].
#[derive(Clone, Debug, Default)]
pub struct DescendList {
    level: i32,
    parent_level: i32,
    radius: f64,
    lambda: f64,
    parent: Option<NodeId>,
    candidates: Vec<usize>,
    next: Vec<usize>,
    results: Vec<NodeId>,
    dist_lookup: SparseCache<f64>,
    current_child_lookup: SparseCache<Option<usize>>,
}

impl DescendList {
    /// Create an empty list for point sets of `len` points.
    pub fn new(len: usize) -> Self {
        Self {
            dist_lookup: SparseCache::new(len),
            current_child_lookup: SparseCache::new(len),
            ..Self::default()
        }
    }

    /// Level currently being examined.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Level at which [`parent`][Self::parent] was found.
    pub fn parent_level(&self) -> i32 {
        self.parent_level
    }

    /// Covering radius of the current level.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Override the covering radius of the current level.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Scale factor bounding a subtree's extent by its level's covering radius.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Closest covering candidate found so far.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Live candidates at the current level.
    pub fn candidates(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.candidates.iter().map(|&i| NodeId::new(i))
    }

    /// Nodes collected by the last range query.
    pub fn results(&self) -> &[NodeId] {
        &self.results
    }

    /// Number of distinct nodes whose distance is cached.
    pub fn number_true_flags(&self) -> usize {
        self.dist_lookup.len()
    }

    /// Cache counters since the last [`reset`][Self::reset].
    pub fn stats(&self) -> TraversalStats {
        TraversalStats {
            distances: self.dist_lookup.stats(),
            child_cursors: self.current_child_lookup.stats(),
        }
    }

    /// Forget candidates, results, and cached values.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.next.clear();
        self.results.clear();
        self.dist_lookup.clear();
        self.current_child_lookup.clear();
        self.parent = None;
    }

    /// Start a new traversal of `cover` at its root level, with zeroed counters.
    pub fn reset<P: PointSet>(&mut self, cover: &Cover<P>) {
        self.clear();
        self.dist_lookup.set_domain(cover.len());
        self.current_child_lookup.set_domain(cover.len());
        self.dist_lookup.reset_stats();
        self.current_child_lookup.reset_stats();
        let base = cover.base();
        self.lambda = base / (base - 1.0);
        self.level = cover.min_level();
        self.parent_level = cover.min_level();
        self.radius = cover.radius();
    }

    /// Distance between stored points `a` and `b`, cached under `b`.
    ///
    /// Within one traversal the metric runs at most once per `b`.
    pub fn get_dist<P: PointSet>(&mut self, cover: &Cover<P>, a: NodeId, b: NodeId) -> f64 {
        self.dist_between(cover, a.index(), b.index())
    }

    /// Distance between a free point and stored point `b`, cached under `b`.
    pub fn get_dist_to_point<P: PointSet>(
        &mut self,
        cover: &Cover<P>,
        point: &P::Point,
        b: NodeId,
    ) -> f64 {
        self.dist_to(cover, point, b.index())
    }

    /// Next child of `node` that this traversal has not expanded yet.
    pub fn get_current_child<P: PointSet>(
        &mut self,
        cover: &Cover<P>,
        node: NodeId,
    ) -> Option<NodeId> {
        self.cursor(cover, node.index()).map(NodeId::new)
    }

    /// Move the child cursor of `node`.
    pub fn set_current_child(&mut self, node: NodeId, child: Option<NodeId>) {
        self.current_child_lookup
            .set(node.index(), child.map(NodeId::index));
    }

    pub(crate) fn dist_between<P: PointSet>(&mut self, cover: &Cover<P>, a: usize, b: usize) -> f64 {
        if let Some(d) = self.dist_lookup.get(b) {
            return d;
        }
        let d = cover.points().distance(a, b);
        self.dist_lookup.set(b, d);
        d
    }

    fn dist_to<P: PointSet>(&mut self, cover: &Cover<P>, point: &P::Point, b: usize) -> f64 {
        if let Some(d) = self.dist_lookup.get(b) {
            return d;
        }
        let d = cover.points().distance_to(point, b);
        self.dist_lookup.set(b, d);
        d
    }

    fn cursor<P: PointSet>(&mut self, cover: &Cover<P>, node: usize) -> Option<usize> {
        match self.current_child_lookup.get(node) {
            Some(cursor) => cursor,
            None => cover.children_store().first(node),
        }
    }

    /// Push the children of `node` that live exactly at `level` onto `out`.
    ///
    /// Children are kept sorted by level, so the run at `level` starts at the
    /// cursor; the cursor is left on the first deeper child.
    fn expand<P: PointSet>(
        &mut self,
        cover: &Cover<P>,
        node: usize,
        level: i32,
        out: &mut Vec<usize>,
    ) {
        let mut cursor = self.cursor(cover, node);
        let start = cursor;
        while let Some(child) = cursor {
            if cover.level_of(child) != Some(level) {
                break;
            }
            out.push(child);
            cursor = cover.children_store().next(child);
        }
        if cursor != start || !self.current_child_lookup.contains(node) {
            self.current_child_lookup.set(node, cursor);
        }
    }

    /// Run an insertion descent for the stored point `index`.
    ///
    /// The list must have been [`reset`][Self::reset] for this insertion, and the
    /// point must lie within the root's covering radius. Growing the root between
    /// the reset and this call is fine. The descent runs at most
    /// [`Cover::max_descend`] steps.
    pub fn descend<P: PointSet>(&mut self, cover: &Cover<P>, index: NodeId) -> Placement {
        let Some(root) = cover.root() else {
            return Placement::Exhausted;
        };
        let index = index.index();
        let root = root.index();
        let root_dist = self.dist_between(cover, index, root);
        if root_dist == 0.0 {
            return Placement::Duplicate(NodeId::new(root));
        }
        debug_assert!(
            root_dist <= cover.radius(),
            "insertion must start inside the root radius"
        );

        self.candidates.clear();
        self.candidates.push(root);
        self.level = cover.min_level();
        self.radius = cover.radius();
        self.parent = Some(NodeId::new(root));
        self.parent_level = self.level;

        let mut next = mem::take(&mut self.next);
        let mut placement = Placement::Exhausted;
        for _ in 0..cover.max_descend() {
            let child_level = self.level + 1;
            next.clear();
            for i in 0..self.candidates.len() {
                let q = self.candidates[i];
                next.push(q);
                self.expand(cover, q, child_level, &mut next);
            }

            let mut duplicate = None;
            for &c in &next {
                if self.dist_between(cover, index, c) == 0.0 {
                    duplicate = Some(c);
                    break;
                }
            }
            if let Some(c) = duplicate {
                placement = Placement::Duplicate(NodeId::new(c));
                break;
            }

            let reach = self.lambda * cover.radius_at(child_level);
            next.retain(|&c| self.dist_lookup.peek(c).is_some_and(|d| d <= reach));
            if next.is_empty() {
                placement = self.attachment();
                break;
            }

            let child_radius = cover.radius_at(child_level);
            let mut closest: Option<(usize, f64)> = None;
            for &c in &next {
                let d = self.dist_between(cover, index, c);
                if closest.is_none_or(|(_, best)| d < best) {
                    closest = Some((c, d));
                }
            }
            if let Some((c, d)) = closest
                && d <= child_radius
            {
                self.parent = Some(NodeId::new(c));
                self.parent_level = child_level;
            }

            mem::swap(&mut self.candidates, &mut next);
            self.level = child_level;
            self.radius = child_radius;
        }
        self.next = next;
        placement
    }

    fn attachment(&self) -> Placement {
        match self.parent {
            Some(parent) => Placement::Attach {
                parent,
                level: self.parent_level + 1,
            },
            None => Placement::Exhausted,
        }
    }

    /// Collect the `k` attached nodes closest to `point` into `out`, closest first.
    ///
    /// Equal distances keep the node found first.
    pub fn descend_for_nearest<P: PointSet>(
        &mut self,
        cover: &Cover<P>,
        point: &P::Point,
        k: usize,
        out: &mut Vec<Neighbor>,
    ) {
        self.reset(cover);
        out.clear();
        let Some(root) = cover.root() else {
            return;
        };
        if k == 0 {
            return;
        }
        let root = root.index();
        let mut best: SmallVec<[Neighbor; 8]> = SmallVec::new();
        let d = self.dist_to(cover, point, root);
        offer(&mut best, k, root, d);
        self.parent = Some(NodeId::new(root));
        self.candidates.push(root);

        let mut next = mem::take(&mut self.next);
        while self.level < cover.max_level() && !self.candidates.is_empty() {
            let worst = if best.len() == k {
                best[k - 1].distance
            } else {
                f64::INFINITY
            };
            let reach = self.lambda * self.radius;
            let child_level = self.level + 1;
            next.clear();
            for i in 0..self.candidates.len() {
                let q = self.candidates[i];
                let dq = self.dist_to(cover, point, q);
                if dq - reach > worst {
                    continue;
                }
                next.push(q);
                let first_child = next.len();
                self.expand(cover, q, child_level, &mut next);
                for &c in &next[first_child..] {
                    let d = self.dist_to(cover, point, c);
                    offer(&mut best, k, c, d);
                }
            }
            mem::swap(&mut self.candidates, &mut next);
            self.level = child_level;
            self.radius = cover.radius_at(child_level);
        }
        self.next = next;
        out.extend(best);
    }

    /// Collect into [`results`][Self::results] every attached node within `r` of
    /// `point` whose level is at most `max_level`.
    pub fn descend_for_within<P: PointSet>(
        &mut self,
        cover: &Cover<P>,
        point: &P::Point,
        r: f64,
        max_level: i32,
    ) {
        self.reset(cover);
        let Some(root) = cover.root() else {
            return;
        };
        if max_level < cover.min_level() {
            return;
        }
        let root = root.index();
        if self.dist_to(cover, point, root) <= r {
            self.results.push(NodeId::new(root));
        }
        self.parent = Some(NodeId::new(root));
        self.candidates.push(root);

        let last = cover.max_level().min(max_level);
        let mut next = mem::take(&mut self.next);
        while self.level < last && !self.candidates.is_empty() {
            let reach = self.lambda * self.radius;
            let child_level = self.level + 1;
            next.clear();
            for i in 0..self.candidates.len() {
                let q = self.candidates[i];
                if self.dist_to(cover, point, q) - reach > r {
                    continue;
                }
                next.push(q);
                let first_child = next.len();
                self.expand(cover, q, child_level, &mut next);
                for &c in &next[first_child..] {
                    if self.dist_to(cover, point, c) <= r {
                        self.results.push(NodeId::new(c));
                    }
                }
            }
            mem::swap(&mut self.candidates, &mut next);
            self.level = child_level;
            self.radius = cover.radius_at(child_level);
        }
        self.next = next;
    }
}

/// Insert `(node, distance)` into the sorted best-`k` list, after any equal distances.
fn offer(best: &mut SmallVec<[Neighbor; 8]>, k: usize, node: usize, distance: f64) {
    if best.len() == k {
        match best.last() {
            Some(worst) if distance < worst.distance => {
                best.pop();
            }
            _ => return,
        }
    }
    let at = best.partition_point(|n| n.distance <= distance);
    best.insert(
        at,
        Neighbor {
            id: NodeId::new(node),
            distance,
        },
    );
}
