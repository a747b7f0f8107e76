// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A read-only snapshot of the attached nodes bucketed by level.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::cover::Cover;
use crate::error::Violation;
use crate::points::PointSet;
use crate::types::NodeId;

/// Attached nodes of a [`Cover`] grouped by level, shallowest level first.
///
/// Built by one counting pass, one prefix-sum pass, and one scatter pass. Within a
/// bucket nodes keep index order. The snapshot is not updated by later insertions;
/// rebuild it before reuse.
#[derive(Clone, Debug, Default)]
pub struct Levels {
    min_level: i32,
    max_level: i32,
    level_counters: Vec<usize>,
    level_offsets: Vec<usize>,
    levels: Vec<NodeId>,
}

impl Levels {
    /// Bucket the attached nodes of `cover`.
    pub fn new<P: PointSet>(cover: &Cover<P>) -> Self {
        let min_level = cover.min_level();
        let max_level = cover.max_level();
        let num_levels = cover.num_levels();
        let slot = |level: i32| (level - min_level) as usize;

        let mut level_counters = vec![0_usize; num_levels];
        for index in 0..cover.len() {
            if let Some(level) = cover.level(NodeId::new(index)) {
                level_counters[slot(level)] += 1;
            }
        }

        let mut level_offsets = Vec::with_capacity(num_levels);
        let mut total = 0;
        for &count in &level_counters {
            level_offsets.push(total);
            total += count;
        }

        let mut cursors = level_offsets.clone();
        let mut levels = vec![NodeId::new(0); total];
        for index in 0..cover.len() {
            if let Some(level) = cover.level(NodeId::new(index)) {
                let at = &mut cursors[slot(level)];
                levels[*at] = NodeId::new(index);
                *at += 1;
            }
        }

        Self {
            min_level,
            max_level,
            level_counters,
            level_offsets,
            levels,
        }
    }

    /// Level of the root when the snapshot was taken.
    pub fn min_level(&self) -> i32 {
        self.min_level
    }

    /// Deepest level when the snapshot was taken.
    pub fn max_level(&self) -> i32 {
        self.max_level
    }

    /// Number of buckets.
    pub fn num_levels(&self) -> usize {
        self.level_counters.len()
    }

    /// Start of each bucket in [`levels`][Self::levels], shallowest first.
    pub fn level_offsets(&self) -> &[usize] {
        &self.level_offsets
    }

    fn slot(&self, level: i32) -> Option<usize> {
        if level < self.min_level || level > self.max_level {
            return None;
        }
        Some((level - self.min_level) as usize).filter(|&s| s < self.level_counters.len())
    }

    /// Number of nodes at `level`; zero outside the snapshot's range.
    pub fn level_counter(&self, level: i32) -> usize {
        self.slot(level).map_or(0, |s| self.level_counters[s])
    }

    /// Nodes at `level`, in index order.
    pub fn level(&self, level: i32) -> &[NodeId] {
        match self.slot(level) {
            Some(s) => {
                let start = self.level_offsets[s];
                &self.levels[start..start + self.level_counters[s]]
            }
            None => &[],
        }
    }

    /// All bucketed nodes, grouped by level.
    pub fn levels(&self) -> &[NodeId] {
        &self.levels
    }

    /// Check that the offsets are the prefix sums of the counters.
    pub fn check_levels(&self) -> Result<(), Violation> {
        let mut total = 0;
        for ((&offset, &count), level) in self
            .level_offsets
            .iter()
            .zip(&self.level_counters)
            .zip(self.min_level..)
        {
            if offset != total {
                let violation = Violation::LevelBucket {
                    level,
                    expected: total,
                    actual: offset,
                };
                tracing::warn!(%violation, "level offsets are not prefix sums");
                return Err(violation);
            }
            total += count;
        }
        if total != self.levels.len() {
            let violation = Violation::LevelBucket {
                level: self.max_level,
                expected: total,
                actual: self.levels.len(),
            };
            tracing::warn!(%violation, "level buckets do not cover the node list");
            return Err(violation);
        }
        Ok(())
    }

    /// Write one line per level listing its nodes and their parents.
    pub fn print_on<P: PointSet>(&self, cover: &Cover<P>, out: &mut impl fmt::Write) -> fmt::Result {
        for level in self.min_level..=self.max_level {
            let nodes = self.level(level);
            write!(out, "level {level} ({}):", nodes.len())?;
            for &node in nodes {
                match cover.parent(node) {
                    Some(parent) => write!(out, " {}<{}", node.index(), parent.index())?,
                    None => write!(out, " {}", node.index())?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
