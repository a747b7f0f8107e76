// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invariant checkers and brute-force query oracles.
//!
//! These are diagnostics: they never modify the tree, and they report the first
//! broken relationship they find. Each violation is also logged at `warn` level.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::cover::Cover;
use crate::error::Violation;
use crate::levels::Levels;
use crate::points::PointSet;
use crate::types::{Neighbor, NodeId, NodeRole};

fn report(violation: Violation) -> Result<(), Violation> {
    tracing::warn!(%violation, "cover tree invariant violated");
    Err(violation)
}

impl<P: PointSet> Cover<P> {
    /// Check the covering invariant: every ordinary node lies within its parent's
    /// covering radius, and below its parent's level.
    ///
    /// `radii[i]` receives the distance from node `i` to its parent, or zero for
    /// nodes without one; entries past the end of `radii` are checked but not recorded.
    pub fn check_distances(&self, radii: &mut [f64]) -> Result<(), Violation> {
        radii.fill(0.0);
        for index in 0..self.len() {
            let Some(NodeRole::Ordinary { level, parent }) = self.role(NodeId::new(index)) else {
                continue;
            };
            let node = NodeId::new(index);
            let Some(parent_level) = self.level(parent) else {
                return report(Violation::ChildParentMismatch {
                    child: node,
                    listed_under: parent,
                    parent: Some(parent),
                });
            };
            if level <= parent_level {
                return report(Violation::LevelOrder {
                    node,
                    parent,
                    level,
                    parent_level,
                });
            }
            let distance = self.points().distance(index, parent.index());
            if let Some(slot) = radii.get_mut(index) {
                *slot = distance;
            }
            let bound = self.radius_at(parent_level);
            if distance.is_nan() || distance > bound {
                return report(Violation::Covering {
                    node,
                    parent,
                    distance,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Check that child lists and parent links agree, and that no node is listed twice.
    pub fn check_children(&self) -> Result<(), Violation> {
        let mut listed_under: HashMap<usize, usize> = HashMap::new();
        for parent in 0..self.len() {
            // A cycle in a corrupted list would never end; no list can be longer than the domain.
            for child in self.raw_children(parent).take(self.len() + 1) {
                if let Some(first) = listed_under.insert(child, parent) {
                    return report(Violation::MultipleParents {
                        child: NodeId::new(child),
                        first: NodeId::new(first),
                        second: NodeId::new(parent),
                    });
                }
                let recorded = match self.role(NodeId::new(child)) {
                    Some(NodeRole::Ordinary { parent, .. }) => Some(parent),
                    _ => None,
                };
                if recorded != Some(NodeId::new(parent)) {
                    return report(Violation::ChildParentMismatch {
                        child: NodeId::new(child),
                        listed_under: NodeId::new(parent),
                        parent: recorded,
                    });
                }
            }
        }
        for index in 0..self.len() {
            if let Some(NodeRole::Ordinary { parent, .. }) = self.role(NodeId::new(index))
                && !listed_under.contains_key(&index)
            {
                return report(Violation::MissingChild {
                    child: NodeId::new(index),
                    parent,
                });
            }
        }
        Ok(())
    }

    /// Check a [`Levels`] snapshot against the live levels of this tree.
    pub fn check_levels(&self, levels: &Levels) -> Result<(), Violation> {
        levels.check_levels()?;
        let mut expected: HashMap<i32, usize> = HashMap::new();
        for index in 0..self.len() {
            if let Some(level) = self.level(NodeId::new(index)) {
                *expected.entry(level).or_default() += 1;
            }
        }
        for level in levels.min_level()..=levels.max_level() {
            for &node in levels.level(level) {
                let actual = self.level(node);
                if actual != Some(level) {
                    return report(Violation::MisfiledNode {
                        node,
                        filed: level,
                        actual,
                    });
                }
            }
        }
        let mut live: Vec<_> = expected.into_iter().collect();
        live.sort_unstable();
        for (level, count) in live {
            let actual = levels.level_counter(level);
            if actual != count {
                return report(Violation::LevelBucket {
                    level,
                    expected: count,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Compare a nearest-neighbor answer with a brute-force scan of the attached nodes.
    ///
    /// Distances are compared rank by rank, since equal distances may legitimately
    /// resolve to different nodes. Each reported node must also be attached and
    /// really lie at its reported distance.
    pub fn check_find_nearest(
        &self,
        point: &P::Point,
        k: usize,
        found: &[Neighbor],
    ) -> Result<(), Violation> {
        let mut all: Vec<f64> = (0..self.len())
            .filter(|&i| self.level(NodeId::new(i)).is_some())
            .map(|i| self.points().distance_to(point, i))
            .collect();
        all.sort_by(f64::total_cmp);
        all.truncate(k);

        for rank in 0..all.len().max(found.len()) {
            let expected = all.get(rank).copied();
            let actual = found.get(rank).map(|n| n.distance);
            if expected != actual {
                return report(Violation::NearestMismatch {
                    rank,
                    expected,
                    actual,
                });
            }
        }

        let mut seen = HashSet::new();
        for neighbor in found {
            let actual = self
                .level(neighbor.id)
                .map(|_| self.points().distance_to(point, neighbor.id.index()));
            if actual != Some(neighbor.distance) || !seen.insert(neighbor.id) {
                return report(Violation::WrongNeighbor {
                    node: neighbor.id,
                    reported: neighbor.distance,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Compare a range answer with a brute-force scan of the attached nodes whose
    /// level is at most `level`.
    pub fn check_find_within(
        &self,
        point: &P::Point,
        r: f64,
        level: i32,
        found: &[NodeId],
    ) -> Result<(), Violation> {
        let mut reported = HashSet::with_capacity(found.len());
        for &node in found {
            let in_range = self.level(node).is_some_and(|l| l <= level)
                && self.points().distance_to(point, node.index()) <= r;
            if !in_range || !reported.insert(node) {
                return report(Violation::WithinSpurious(node));
            }
        }
        for index in 0..self.len() {
            let node = NodeId::new(index);
            let belongs = self.level(node).is_some_and(|l| l <= level)
                && self.points().distance_to(point, index) <= r;
            if belongs && !reported.contains(&node) {
                return report(Violation::WithinMissing(node));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CoverConfig;
    use alloc::vec;
    use kurbo::Point;

    fn scenario() -> Cover<Vec<Point>> {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 1.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert_all();
        cover
    }

    #[test]
    fn scenario_passes_every_checker() {
        let mut cover = scenario();
        let mut radii = vec![f64::NAN; cover.len()];
        assert_eq!(cover.check_distances(&mut radii), Ok(()));
        assert_eq!(radii[0], 0.0, "the root has no parent");
        assert_eq!(radii[1], 1.0);
        assert_eq!(cover.check_children(), Ok(()));
        assert_eq!(cover.check_levels(&Levels::new(&cover)), Ok(()));

        let query = Point::new(5.0, 0.5);
        let found = cover.find_nearest(&query, 1);
        assert_eq!(found[0].distance, 0.5);
        assert_eq!(cover.check_find_nearest(&query, 1, &found), Ok(()));

        let found = cover.find_within(&query, 4.5).to_vec();
        assert_eq!(cover.check_find_within(&query, 4.5, i32::MAX, &found), Ok(()));
    }

    #[test]
    fn stretched_edge_breaks_covering() {
        let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0)];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert(NodeId::new(0));
        cover.make_new_entry(NodeId::new(1), 1, NodeId::new(0));
        let err = cover.check_distances(&mut []).unwrap_err();
        assert_eq!(
            err,
            Violation::Covering {
                node: NodeId::new(1),
                parent: NodeId::new(0),
                distance: 3.0,
                bound: 1.0,
            }
        );
    }

    #[test]
    fn inverted_levels_are_reported() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.1, 0.0),
            Point::new(0.2, 0.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert(NodeId::new(0));
        cover.make_new_entry(NodeId::new(1), 3, NodeId::new(0));
        cover.make_new_entry(NodeId::new(2), 2, NodeId::new(1));
        assert!(matches!(
            cover.check_distances(&mut []),
            Err(Violation::LevelOrder { level: 2, parent_level: 3, .. })
        ));
    }

    #[test]
    fn unlisted_and_misplaced_children_are_reported() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(0.6, 0.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert(NodeId::new(0));
        cover.make_new_entry(NodeId::new(1), 1, NodeId::new(0));
        cover.append(NodeId::new(2), 1, NodeId::new(0), None);
        assert_eq!(cover.check_children(), Ok(()));

        let mut bad = Cover::new(
            vec![Point::new(0.0, 0.0), Point::new(0.5, 0.0), Point::new(0.6, 0.0)],
            CoverConfig::default(),
        )
        .unwrap();
        bad.insert(NodeId::new(0));
        bad.make_new_entry(NodeId::new(1), 1, NodeId::new(0));
        // 2 is listed under 1 but was never given a role.
        bad.append_to_children(NodeId::new(1), NodeId::new(2));
        assert_eq!(
            bad.check_children(),
            Err(Violation::ChildParentMismatch {
                child: NodeId::new(2),
                listed_under: NodeId::new(1),
                parent: None,
            })
        );
    }

    #[test]
    fn stale_levels_snapshot_is_reported() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let mut cover = Cover::new(points, CoverConfig::default()).unwrap();
        cover.insert(NodeId::new(0));
        cover.insert(NodeId::new(1));
        let levels = Levels::new(&cover);
        cover.insert(NodeId::new(2));
        assert!(matches!(
            cover.check_levels(&levels),
            Err(Violation::LevelBucket { .. })
        ));
    }

    #[test]
    fn oracles_reject_wrong_answers() {
        let mut cover = scenario();
        let query = Point::new(0.0, 0.0);
        let mut found = cover.find_nearest(&query, 2);
        assert_eq!(cover.check_find_nearest(&query, 2, &found), Ok(()));
        found.pop();
        assert!(matches!(
            cover.check_find_nearest(&query, 2, &found),
            Err(Violation::NearestMismatch { rank: 1, .. })
        ));
        found[0].id = NodeId::new(3);
        assert!(matches!(
            cover.check_find_nearest(&query, 1, &found),
            Err(Violation::WrongNeighbor { .. })
        ));

        let found = cover.find_within(&query, 1.0).to_vec();
        assert_eq!(found.len(), 2);
        assert_eq!(
            cover.check_find_within(&query, 1.0, i32::MAX, &found[..1]),
            Err(Violation::WithinMissing(found[1]))
        );
        assert_eq!(
            cover.check_find_within(&query, 1.0, i32::MAX, &[NodeId::new(2)]),
            Err(Violation::WithinSpurious(NodeId::new(2)))
        );
    }
}
