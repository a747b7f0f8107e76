// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point sets: the metric collaborator the tree is built over.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

/// A fixed collection of points with a metric.
///
/// The tree never mutates the point set; it only asks for distances. All pruning
/// assumes `distance` is a true metric: non-negative, symmetric, zero only for
/// equal points, and obeying the triangle inequality. A metric that breaks the
/// triangle inequality produces wrong query answers, never memory unsafety.
pub trait PointSet {
    /// Type of a free query point (not necessarily stored in the set).
    type Point: ?Sized;

    /// Number of points in the set.
    fn len(&self) -> usize;

    /// Whether the set is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between the stored points `a` and `b`.
    fn distance(&self, a: usize, b: usize) -> f64;

    /// Distance between a free point and the stored point `b`.
    fn distance_to(&self, point: &Self::Point, b: usize) -> f64;
}

impl<T: PointSet + ?Sized> PointSet for &T {
    type Point = T::Point;

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn distance(&self, a: usize, b: usize) -> f64 {
        (**self).distance(a, b)
    }

    #[inline]
    fn distance_to(&self, point: &Self::Point, b: usize) -> f64 {
        (**self).distance_to(point, b)
    }
}

/// Euclidean points stored row-major in one flat, caller-owned buffer.
///
/// This is the layout numeric hosts hand over: `len * dim` coordinates, one
/// point per row. Query points passed to [`PointSet::distance_to`] must have
/// exactly `dim` coordinates; a query of another dimension panics.
///
/// ```rust
/// use understory_cover_tree::{FlatPoints, PointSet};
///
/// let coords = [0.0, 0.0, 3.0, 4.0];
/// let points = FlatPoints::new(&coords, 2);
/// assert_eq!(points.len(), 2);
/// assert_eq!(points.distance(0, 1), 5.0);
/// assert_eq!(points.distance_to(&[0.0, 4.0], 1), 3.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FlatPoints<'a> {
    coords: &'a [f64],
    dim: usize,
}

impl<'a> FlatPoints<'a> {
    /// Wrap `coords` as points of dimension `dim`.
    ///
    /// Trailing coordinates that do not fill a whole row are ignored.
    pub fn new(coords: &'a [f64], dim: usize) -> Self {
        debug_assert!(dim > 0, "point dimension must be positive");
        debug_assert!(
            coords.len() % dim.max(1) == 0,
            "coordinate buffer length {} is not a multiple of {dim}",
            coords.len()
        );
        Self { coords, dim }
    }

    /// Dimension of every point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of the point at `index`.
    pub fn row(&self, index: usize) -> &'a [f64] {
        let start = index * self.dim;
        &self.coords[start..start + self.dim]
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "points must share a dimension");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

impl PointSet for FlatPoints<'_> {
    type Point = [f64];

    fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.coords.len() / self.dim
        }
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        euclidean(self.row(a), self.row(b))
    }

    fn distance_to(&self, point: &[f64], b: usize) -> f64 {
        assert_eq!(
            point.len(),
            self.dim,
            "query point has {} coordinates, the set has dimension {}",
            point.len(),
            self.dim
        );
        euclidean(point, self.row(b))
    }
}

impl PointSet for [Point] {
    type Point = Point;

    fn len(&self) -> usize {
        <[Point]>::len(self)
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        self[a].distance(self[b])
    }

    fn distance_to(&self, point: &Point, b: usize) -> f64 {
        point.distance(self[b])
    }
}

impl PointSet for Vec<Point> {
    type Point = Point;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        self[a].distance(self[b])
    }

    fn distance_to(&self, point: &Point, b: usize) -> f64 {
        point.distance(self[b])
    }
}
