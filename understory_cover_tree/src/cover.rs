// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cover tree: node bookkeeping, insertion, and queries.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::child_lists::{ChildLists, Children};
use crate::descend::{DescendList, Placement, TraversalStats};
use crate::error::CoverError;
use crate::points::PointSet;
use crate::types::{CoverConfig, Neighbor, NodeId, NodeRole};

/// A cover tree over the points of a [`PointSet`].
///
/// Every point is a potential node, identified by its index. Points join the
/// tree through [`Cover::insert`] and are never removed. Levels grow toward the
/// leaves: the root sits at [`min_level`][Self::min_level] (never positive), and
/// a node at level `l` covers its descendants within `base^-l` per edge.
///
/// The tree owns one [`DescendList`] that every insertion and query reuses, so
/// those calls take `&mut self`. Queries that must share the tree can bring their
/// own list through [`find_nearest_with`][Self::find_nearest_with] and
/// [`find_within_with`][Self::find_within_with].
///
/// ## Example
///
/// ```rust
/// use kurbo::Point;
/// use understory_cover_tree::{Cover, CoverConfig, NodeId};
///
/// let points = vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(5.0, 0.0),
///     Point::new(5.0, 1.0),
/// ];
/// let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
/// cover.insert_all();
///
/// let nearest = cover.find_nearest(&Point::new(5.0, 0.6), 1);
/// assert_eq!(nearest[0].id, NodeId::new(3));
///
/// let within = cover.find_within(&Point::new(0.0, 0.0), 1.5).to_vec();
/// assert_eq!(within.len(), 2);
/// ```
pub struct Cover<P: PointSet> {
    points: P,
    roles: Vec<Option<NodeRole>>,
    root: Option<usize>,
    cover_number: usize,
    num_duplicates: usize,
    num_orphans: usize,
    /// Level of the root; only ever decreases.
    min_level: i32,
    /// Deepest level of any attached node; only ever increases.
    max_level: i32,
    max_descend: u32,
    base: f64,
    /// `base^-min_level`
    radius: f64,
    children: ChildLists,
    descend_list: DescendList,
}

impl<P: PointSet> fmt::Debug for Cover<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cover")
            .field("len", &self.len())
            .field("root", &self.root)
            .field("cover_number", &self.cover_number)
            .field("num_duplicates", &self.num_duplicates)
            .field("num_orphans", &self.num_orphans)
            .field("min_level", &self.min_level)
            .field("max_level", &self.max_level)
            .field("base", &self.base)
            .field("radius", &self.radius)
            .finish_non_exhaustive()
    }
}

impl<P: PointSet> Cover<P> {
    /// Create an empty tree over `points`.
    ///
    /// Fails when the base is not a finite number above one, when the deepest
    /// covering radius reachable within `max_descend` levels underflows, when the
    /// levels spanning the whole `f64` range plus `max_descend` do not fit in an
    /// `i32`, or when the point set is too large for [`NodeId`].
    pub fn new(points: P, config: CoverConfig) -> Result<Self, CoverError> {
        let CoverConfig { base, max_descend } = config;
        if !base.is_finite() || base <= 1.0 {
            return Err(CoverError::InvalidBase(base));
        }
        // Root growth may lower the root level until `base^-min_level` passes `f64::MAX`.
        let span = f64::MAX.ln() / base.ln() + f64::from(max_descend) + 2.0;
        if span >= f64::from(i32::MAX) {
            return Err(CoverError::LevelOverflow { base, max_descend });
        }
        let too_deep = CoverError::DescendTooDeep { base, max_descend };
        let depth = i32::try_from(max_descend).map_err(|_| too_deep)?;
        let deepest = base.powi(depth.saturating_neg());
        let lambda = base / (base - 1.0);
        if deepest <= 0.0 || !lambda.is_finite() {
            return Err(too_deep);
        }
        let len = points.len();
        if len >= u32::MAX as usize {
            return Err(CoverError::TooManyPoints(len));
        }
        Ok(Self {
            points,
            roles: vec![None; len],
            root: None,
            cover_number: 0,
            num_duplicates: 0,
            num_orphans: 0,
            min_level: 0,
            max_level: 0,
            max_descend,
            base,
            radius: 1.0,
            children: ChildLists::new(len),
            descend_list: DescendList::new(len),
        })
    }

    /// The point set the tree indexes.
    pub fn points(&self) -> &P {
        &self.points
    }

    /// Number of points in the point set, attached or not.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the point set is empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Number of attached nodes (root and ordinary nodes).
    pub fn cover_number(&self) -> usize {
        self.cover_number
    }

    /// Number of points found to coincide with an attached node.
    pub fn num_duplicates(&self) -> usize {
        self.num_duplicates
    }

    /// Number of points abandoned after exhausting the descent budget.
    pub fn num_orphans(&self) -> usize {
        self.num_orphans
    }

    /// The root, once the first point has been inserted.
    pub fn root(&self) -> Option<NodeId> {
        self.root.map(NodeId::new)
    }

    /// Geometric base of the covering radii.
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Covering radius of the root, `base^-min_level`.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Level of the root.
    pub fn min_level(&self) -> i32 {
        self.min_level
    }

    /// Deepest level of any attached node.
    pub fn max_level(&self) -> i32 {
        self.max_level
    }

    /// `max_level - min_level + 1`
    pub fn num_levels(&self) -> usize {
        (self.max_level - self.min_level) as usize + 1
    }

    /// Maximum number of levels an insertion may descend below the root.
    pub fn max_descend(&self) -> u32 {
        self.max_descend
    }

    /// Covering radius of `level`, `base^-level`.
    #[inline]
    pub fn radius_at(&self, level: i32) -> f64 {
        self.base.powi(level.saturating_neg())
    }

    /// What `id` became, or `None` if it has not been inserted.
    pub fn role(&self, id: NodeId) -> Option<NodeRole> {
        self.roles.get(id.index()).copied().flatten()
    }

    /// Level of an attached node.
    pub fn level(&self, id: NodeId) -> Option<i32> {
        self.level_of(id.index())
    }

    pub(crate) fn level_of(&self, index: usize) -> Option<i32> {
        match self.roles.get(index).copied().flatten()? {
            NodeRole::Root => Some(self.min_level),
            NodeRole::Ordinary { level, .. } => Some(level),
            NodeRole::Duplicate { .. } | NodeRole::Orphan => None,
        }
    }

    /// Parent of an ordinary node, or the node a duplicate coincides with.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        match self.role(id)? {
            NodeRole::Ordinary { parent, .. } => Some(parent),
            NodeRole::Duplicate { of } => Some(of),
            NodeRole::Root | NodeRole::Orphan => None,
        }
    }

    /// Whether `id` was inserted as a duplicate.
    pub fn is_duplicate(&self, id: NodeId) -> bool {
        matches!(self.role(id), Some(NodeRole::Duplicate { .. }))
    }

    /// First (shallowest) child of `id`.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children.first(id.index()).map(NodeId::new)
    }

    /// Last (deepest) child of `id`.
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children.last(id.index()).map(NodeId::new)
    }

    /// Children of `id`, ordered by level.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter(id.index()).map(NodeId::new)
    }

    /// The child lists of all nodes.
    pub fn children_store(&self) -> &ChildLists {
        &self.children
    }

    pub(crate) fn raw_children(&self, index: usize) -> Children<'_> {
        self.children.iter(index)
    }

    /// Lower the root level until the root radius reaches `distance`.
    ///
    /// The root stays the root; its level simply becomes the new, more negative
    /// [`min_level`][Self::min_level]. Every covering bound already recorded stays
    /// valid because the root's radius only grows.
    ///
    /// Returns whether the root radius now covers `distance`. It does not for a
    /// non-finite distance, which leaves the tree unchanged.
    pub fn new_root(&mut self, distance: f64) -> bool {
        if self.radius >= distance {
            return true;
        }
        if !distance.is_finite() {
            return false;
        }
        let jump = ((distance / self.radius).ln() / self.base.ln()).ceil() - 1.0;
        if jump >= 1.0 {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "The jump is clamped to the i32 range first."
            )]
            let jump = jump.min(f64::from(i32::MAX)) as i32;
            self.min_level = self.min_level.saturating_sub(jump);
            self.radius = self.radius_at(self.min_level);
        }
        while self.radius < distance {
            let Some(level) = self.min_level.checked_sub(1) else {
                break;
            };
            self.min_level = level;
            self.radius = self.radius_at(level);
        }
        tracing::debug!(
            distance,
            min_level = self.min_level,
            radius = self.radius,
            "grew the root radius"
        );
        self.radius >= distance
    }

    /// Record `id` as an ordinary node at `level` below `parent`.
    ///
    /// The node is linked into the parent's children at its level position.
    pub fn make_new_entry(&mut self, id: NodeId, level: i32, parent: NodeId) {
        self.set_entry(id, level, parent);
        self.insert_in_children_at_right_level(parent, id, level);
    }

    /// Record `id` as an ordinary node and link it after the sibling `after`
    /// (at the front when `None`).
    pub fn append(&mut self, id: NodeId, level: i32, parent: NodeId, after: Option<NodeId>) {
        self.set_entry(id, level, parent);
        match after {
            Some(sibling) => self
                .children
                .insert_after(parent.index(), sibling.index(), id.index()),
            None => self.children.prepend(parent.index(), id.index()),
        }
    }

    fn set_entry(&mut self, id: NodeId, level: i32, parent: NodeId) {
        debug_assert!(
            self.roles[id.index()].is_none(),
            "node {id:?} already has a role"
        );
        self.roles[id.index()] = Some(NodeRole::Ordinary { level, parent });
        self.cover_number += 1;
        self.max_level = self.max_level.max(level);
    }

    /// Link `child` at the end of `parent`'s children.
    ///
    /// Queries expect children ordered by level; callers linking by hand keep that order.
    pub fn append_to_children(&mut self, parent: NodeId, child: NodeId) {
        self.children.append(parent.index(), child.index());
    }

    /// Link `child` at the front of `parent`'s children.
    pub fn prepend_to_children(&mut self, parent: NodeId, child: NodeId) {
        self.children.prepend(parent.index(), child.index());
    }

    /// Link `child` among `parent`'s children after every sibling at or above `level`.
    pub fn insert_in_children_at_right_level(&mut self, parent: NodeId, child: NodeId, level: i32) {
        let mut sibling = self.children.last(parent.index());
        while let Some(s) = sibling {
            if self.level_of(s).is_some_and(|l| l <= level) {
                break;
            }
            sibling = self.children.prev(s);
        }
        match sibling {
            Some(s) => self
                .children
                .insert_after(parent.index(), s, child.index()),
            None => self.children.prepend(parent.index(), child.index()),
        }
    }

    /// Insert the point `id` and report what it became.
    ///
    /// The first point becomes the root. A point farther from the root than the
    /// root radius grows the radius first. Each later point then descends from the
    /// root and either coincides with an attached node (duplicate), attaches below
    /// the closest covering candidate, or runs out of
    /// [`max_descend`][Self::max_descend] levels and is left an orphan.
    ///
    /// Inserting an id that already has a role changes nothing and returns that role.
    /// A point whose distance to the root is not finite becomes an orphan without
    /// touching the root radius.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an index of the point set.
    pub fn insert(&mut self, id: NodeId) -> NodeRole {
        let index = id.index();
        if let Some(role) = self.roles[index] {
            return role;
        }
        let Some(root) = self.root else {
            self.root = Some(index);
            self.roles[index] = Some(NodeRole::Root);
            self.cover_number += 1;
            return NodeRole::Root;
        };

        let mut list = mem::take(&mut self.descend_list);
        list.reset(self);
        let distance = list.dist_between(self, index, root);
        let placement = if self.new_root(distance) {
            list.descend(self, id)
        } else {
            Placement::Exhausted
        };
        self.descend_list = list;

        let role = match placement {
            Placement::Duplicate(of) => {
                tracing::trace!(index, of = of.index(), "duplicate point");
                self.num_duplicates += 1;
                NodeRole::Duplicate { of }
            }
            Placement::Attach { parent, level } => {
                self.make_new_entry(id, level, parent);
                return NodeRole::Ordinary { level, parent };
            }
            Placement::Exhausted => {
                tracing::debug!(index, max_descend = self.max_descend, "orphaned point");
                self.num_orphans += 1;
                NodeRole::Orphan
            }
        };
        self.roles[index] = Some(role);
        role
    }

    /// Insert every point in index order.
    pub fn insert_all(&mut self) {
        for index in 0..self.len() {
            self.insert(NodeId::new(index));
        }
    }

    /// The list used by the most recent insertion or query.
    pub fn descend_list(&self) -> &DescendList {
        &self.descend_list
    }

    /// Forget the candidates, results, and caches of the owned list.
    pub fn clear_descend_list(&mut self) {
        self.descend_list.clear();
    }

    /// Cache counters of the most recent insertion or query.
    pub fn stats(&self) -> TraversalStats {
        self.descend_list.stats()
    }

    /// The `k` attached nodes closest to `point`, closest first.
    ///
    /// Fewer than `k` are returned when fewer are attached. Equal distances keep
    /// the node the descent met first.
    pub fn find_nearest(&mut self, point: &P::Point, k: usize) -> Vec<Neighbor> {
        let mut list = mem::take(&mut self.descend_list);
        let found = self.find_nearest_with(&mut list, point, k);
        self.descend_list = list;
        found
    }

    /// [`find_nearest`][Self::find_nearest] using a caller-owned list.
    pub fn find_nearest_with(
        &self,
        list: &mut DescendList,
        point: &P::Point,
        k: usize,
    ) -> Vec<Neighbor> {
        let mut out = Vec::with_capacity(k.min(self.cover_number));
        list.descend_for_nearest(self, point, k, &mut out);
        out
    }

    /// Every attached node within `r` of `point`.
    pub fn find_within(&mut self, point: &P::Point, r: f64) -> &[NodeId] {
        self.find_within_at_level(point, r, i32::MAX)
    }

    /// Every attached node within `r` of `point` whose level is at most `level`.
    ///
    /// The nodes at or above a level form a net of the data at that level's radius.
    /// The result stays in the owned [`DescendList`] until the next call.
    pub fn find_within_at_level(&mut self, point: &P::Point, r: f64, level: i32) -> &[NodeId] {
        let mut list = mem::take(&mut self.descend_list);
        self.find_within_with(&mut list, point, r, level);
        self.descend_list = list;
        self.descend_list.results()
    }

    /// [`find_within_at_level`][Self::find_within_at_level] using a caller-owned list.
    pub fn find_within_with<'a>(
        &self,
        list: &'a mut DescendList,
        point: &P::Point,
        r: f64,
        level: i32,
    ) -> &'a [NodeId] {
        list.descend_for_within(self, point, r, level);
        list.results()
    }

    /// Append the results of the last range query to `out`.
    pub fn fill_from_descend_list(&self, out: &mut Vec<NodeId>) {
        out.extend_from_slice(self.descend_list.results());
    }

    /// Write a human-readable dump of the first `n` nodes.
    pub fn print_on(&self, n: usize, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(
            out,
            "cover: {} points, {} attached, {} duplicates, {} orphans",
            self.len(),
            self.cover_number,
            self.num_duplicates,
            self.num_orphans
        )?;
        writeln!(
            out,
            "levels {}..={} base {} radius {}",
            self.min_level, self.max_level, self.base, self.radius
        )?;
        for index in 0..n.min(self.len()) {
            write!(out, "{index}: ")?;
            match self.roles[index] {
                None => writeln!(out, "not inserted")?,
                Some(NodeRole::Root) => writeln!(out, "root level {}", self.min_level)?,
                Some(NodeRole::Ordinary { level, parent }) => {
                    writeln!(out, "level {level} parent {}", parent.index())?;
                }
                Some(NodeRole::Duplicate { of }) => writeln!(out, "duplicate of {}", of.index())?,
                Some(NodeRole::Orphan) => writeln!(out, "orphan")?,
            }
            let mut children = self.raw_children(index).peekable();
            if children.peek().is_some() {
                write!(out, "  children:")?;
                for child in children {
                    write!(out, " {child}")?;
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use kurbo::Point;

    fn scenario() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 1.0),
        ]
    }

    #[test]
    fn rejects_bad_configuration() {
        let err = Cover::new(scenario(), CoverConfig::default().with_base(1.0)).unwrap_err();
        assert_eq!(err, CoverError::InvalidBase(1.0));
        let err = Cover::new(scenario(), CoverConfig::default().with_base(f64::NAN)).unwrap_err();
        assert!(matches!(err, CoverError::InvalidBase(_)), "NaN base: {err:?}");
        let err = Cover::new(scenario(), CoverConfig::default().with_base(-2.0)).unwrap_err();
        assert!(matches!(err, CoverError::InvalidBase(_)), "negative base: {err:?}");
        let err = Cover::new(
            scenario(),
            CoverConfig::default().with_base(2.0).with_max_descend(5_000),
        )
        .unwrap_err();
        assert!(
            matches!(err, CoverError::DescendTooDeep { .. }),
            "2^-5000 underflows: {err:?}"
        );
    }

    #[test]
    fn base_too_close_to_one_fails_at_construction() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let base = 1.0 + 1e-9;
        let err = Cover::new(points, CoverConfig::default().with_base(base)).unwrap_err();
        assert_eq!(
            err,
            CoverError::LevelOverflow {
                base,
                max_descend: 64
            }
        );

        // The smallest accepted bases still grow the root without overflowing.
        let points = vec![Point::new(0.0, 0.0), Point::new(1e300, 0.0)];
        let mut cover = Cover::new(points, CoverConfig::default().with_base(1.0 + 1e-6)).unwrap();
        cover.insert_all();
        assert!(cover.radius() >= 1e300, "root radius must cover the far point");
        assert!(cover.min_level() < 0);
    }

    #[test]
    fn root_growth_reaches_the_end_of_the_float_range() {
        let points = vec![Point::new(0.0, 0.0), Point::new(f64::MAX, 0.0)];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert_all();
        assert!(cover.role(NodeId::new(1)).is_some_and(NodeRole::is_attached));
        assert!(cover.min_level() >= -1025, "min_level {}", cover.min_level());
        assert_eq!(cover.num_orphans(), 0);
    }

    #[test]
    fn non_finite_points_become_orphans_without_growing_the_root() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(f64::INFINITY, 0.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert_all();
        assert_eq!(cover.role(NodeId::new(1)), Some(NodeRole::Orphan));
        assert_eq!(cover.role(NodeId::new(2)), Some(NodeRole::Orphan));
        assert_eq!(cover.num_orphans(), 2);
        assert_eq!(cover.radius(), 1.0, "non-finite distances leave the radius alone");
        assert_eq!(cover.min_level(), 0);
        assert!(!cover.new_root(f64::INFINITY), "an infinite distance cannot be covered");
        assert_eq!(cover.radius(), 1.0);
    }

    #[test]
    fn budget_running_out_mid_descent_orphans_the_point() {
        let points = vec![Point::new(0.0, 0.0), Point::new(0.9, 0.0)];
        let mut cover = Cover::new(points, CoverConfig::default().with_max_descend(1)).unwrap();
        cover.insert_all();
        // One step reaches level 1, where 0.9 is still inside the pruning bound of 1.
        assert_eq!(cover.role(NodeId::new(1)), Some(NodeRole::Orphan));
        assert_eq!(cover.num_orphans(), 1);
        assert_eq!(cover.cover_number(), 1);

        let points = vec![Point::new(0.0, 0.0), Point::new(0.9, 0.0)];
        let mut cover = Cover::new(points, CoverConfig::default().with_max_descend(2)).unwrap();
        cover.insert_all();
        assert_eq!(
            cover.role(NodeId::new(1)),
            Some(NodeRole::Ordinary {
                level: 1,
                parent: NodeId::new(0)
            }),
            "a second step empties the candidate set"
        );
    }

    #[test]
    fn out_of_range_ids_have_no_role() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        cover.insert_all();
        let stranger = NodeId::new(cover.len() + 3);
        assert_eq!(cover.role(stranger), None);
        assert_eq!(cover.level(stranger), None);
        assert_eq!(cover.parent(stranger), None);
        assert!(!cover.is_duplicate(stranger));
    }

    #[test]
    fn first_point_becomes_root() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        assert_eq!(cover.insert(NodeId::new(2)), NodeRole::Root);
        assert_eq!(cover.root(), Some(NodeId::new(2)));
        assert_eq!(cover.level(NodeId::new(2)), Some(0));
        assert_eq!(cover.cover_number(), 1);
        assert_eq!(cover.radius(), 1.0);
    }

    #[test]
    fn scenario_builds_a_consistent_tree() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        cover.insert_all();
        assert_eq!(cover.cover_number(), 4);
        assert_eq!(cover.num_duplicates(), 0);
        assert_eq!(cover.num_orphans(), 0);

        // {5,0} is 5 away from the root: the radius grows to 8.
        assert_eq!(cover.min_level(), -3);
        assert_eq!(cover.radius(), 8.0);

        for index in 1..4 {
            let id = NodeId::new(index);
            let parent = cover.parent(id).unwrap();
            let level = cover.level(id).unwrap();
            let d = cover.points().distance(index, parent.index());
            assert!(
                d <= cover.radius_at(level - 1),
                "node {index} at {d} exceeds its covering radius"
            );
            assert!(
                cover.children(parent).any(|c| c == id),
                "node {index} missing from its parent's children"
            );
        }
    }

    #[test]
    fn nearest_scenario_prefers_the_closer_point() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        cover.insert_all();
        let found = cover.find_nearest(&Point::new(5.0, 0.6), 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, NodeId::new(3));
        assert!((found[0].distance - 0.4).abs() < 1e-12);

        let found = cover.find_nearest(&Point::new(5.0, 0.5), 2);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].distance, 0.5);
        assert_eq!(found[1].distance, 0.5, "both {{5,0}} and {{5,1}} tie at 0.5");
    }

    #[test]
    fn second_identical_point_is_a_duplicate() {
        let points = vec![Point::new(1.0, 2.0), Point::new(1.0, 2.0), Point::new(3.0, 2.0)];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert(NodeId::new(0));
        cover.insert(NodeId::new(2));
        assert_eq!(cover.cover_number(), 2);
        assert_eq!(cover.num_duplicates(), 0);

        let role = cover.insert(NodeId::new(1));
        assert_eq!(role, NodeRole::Duplicate { of: NodeId::new(0) });
        assert_eq!(cover.num_duplicates(), 1);
        assert_eq!(cover.cover_number(), 2, "duplicates are not attached");
        assert!(cover.is_duplicate(NodeId::new(1)));
        assert_eq!(cover.parent(NodeId::new(1)), Some(NodeId::new(0)));
        assert_eq!(cover.level(NodeId::new(1)), None);
    }

    #[test]
    fn duplicates_are_found_below_the_root() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.3, 0.0),
            Point::new(0.3, 0.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert_all();
        assert_eq!(
            cover.role(NodeId::new(2)),
            Some(NodeRole::Duplicate { of: NodeId::new(1) })
        );
    }

    #[test]
    fn reinserting_returns_the_existing_role() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        cover.insert_all();
        let before = cover.role(NodeId::new(3)).unwrap();
        assert_eq!(cover.insert(NodeId::new(3)), before);
        assert_eq!(cover.cover_number(), 4);
        assert_eq!(cover.num_duplicates(), 0);
    }

    #[test]
    fn zero_descent_budget_orphans_every_later_point() {
        let config = CoverConfig::default().with_max_descend(0);
        let mut cover = Cover::new(scenario(), config).unwrap();
        cover.insert_all();
        assert_eq!(cover.cover_number(), 1, "only the root is attached");
        for index in 1..4 {
            let id = NodeId::new(index);
            assert_eq!(cover.role(id), Some(NodeRole::Orphan));
            assert_eq!(cover.level(id), None);
            assert_eq!(cover.parent(id), None);
        }
        assert_eq!(cover.num_orphans(), 3);
        assert_eq!(cover.find_nearest(&Point::new(5.0, 1.0), 3).len(), 1);
    }

    #[test]
    fn root_growth_is_monotone() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(100.0, 0.0),
            Point::new(-1000.0, 0.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        let mut min_level = cover.min_level();
        let mut radius = cover.radius();
        for index in 0..cover.len() {
            cover.insert(NodeId::new(index));
            assert!(cover.min_level() <= min_level, "min_level must not increase");
            assert!(cover.radius() >= radius, "radius must not shrink");
            min_level = cover.min_level();
            radius = cover.radius();
        }
        assert!(cover.radius() >= 1000.0);
        assert!(cover.radius() < 2048.0, "radius grows by whole levels only");
    }

    #[test]
    fn children_stay_sorted_by_level() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        cover.insert(NodeId::new(0));
        let root = NodeId::new(0);
        cover.make_new_entry(NodeId::new(1), 3, root);
        cover.make_new_entry(NodeId::new(2), 1, root);
        cover.make_new_entry(NodeId::new(3), 2, root);
        let levels: Vec<_> = cover
            .children(root)
            .map(|c| cover.level(c).unwrap())
            .collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(cover.first_child(root), Some(NodeId::new(2)));
        assert_eq!(cover.last_child(root), Some(NodeId::new(1)));
        assert_eq!(cover.max_level(), 3);
        assert_eq!(cover.num_levels(), 4);
    }

    #[test]
    fn print_on_lists_roles_and_children() {
        let mut cover = Cover::new(scenario(), CoverConfig::default()).unwrap();
        cover.insert_all();
        let mut out = String::new();
        cover.print_on(4, &mut out).unwrap();
        assert!(out.starts_with("cover: 4 points, 4 attached"), "{out}");
        assert!(out.contains("0: root level -3"), "{out}");
        assert!(out.contains("children:"), "{out}");
    }
}
