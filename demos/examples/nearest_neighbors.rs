// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build a cover tree over a scattered point cloud and query it.
//!
//! This example shows how to:
//! - index `kurbo::Point`s and a flat coordinate buffer,
//! - run nearest-neighbor and radius queries and check them against brute force,
//! - inspect the tree by level.
//!
//! Run:
//! - `cargo run -p understory_examples --example nearest_neighbors`

use kurbo::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use understory_cover_tree::{Cover, CoverConfig, FlatPoints, Levels, NodeId};

fn main() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut points: Vec<Point> = (0..500)
        .map(|_| Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect();
    // A few repeats to show duplicate handling.
    points.extend_from_within(..5);

    let mut cover = Cover::new(points, CoverConfig::default()).expect("valid configuration");
    cover.insert_all();
    println!("{cover:?}");
    println!(
        "attached: {}, duplicates: {}, orphans: {}, levels: {}..={}",
        cover.cover_number(),
        cover.num_duplicates(),
        cover.num_orphans(),
        cover.min_level(),
        cover.max_level()
    );

    let query = Point::new(50.0, 50.0);
    let nearest = cover.find_nearest(&query, 5);
    println!(
        "5 nearest to {query:?} (distance evaluations: {}):",
        cover.stats().distances.sets
    );
    for n in &nearest {
        println!("  #{} at {:.3}", n.id.index(), n.distance);
    }
    cover
        .check_find_nearest(&query, 5, &nearest)
        .expect("nearest neighbors match brute force");

    let within = cover.find_within(&query, 10.0).to_vec();
    println!("{} points within 10.0", within.len());
    cover
        .check_find_within(&query, 10.0, i32::MAX, &within)
        .expect("range query matches brute force");

    let levels = Levels::new(&cover);
    for level in levels.min_level()..=levels.max_level() {
        println!("level {level}: {} nodes", levels.level_counter(level));
    }
    cover.check_levels(&levels).expect("levels are consistent");
    cover.check_children().expect("child lists are consistent");

    // The same tree shape over a row-major buffer, as a numeric host would hand it over.
    let coords: Vec<f64> = (0..300).map(|_| rng.gen_range(0.0..1.0)).collect();
    let flat = FlatPoints::new(&coords, 3);
    let mut cover3 = Cover::new(flat, CoverConfig::default().with_base(1.5)).expect("valid base");
    cover3.insert_all();
    let nearest = cover3.find_nearest(&[0.5, 0.5, 0.5][..], 1);
    println!(
        "3D: {} points, nearest to the center is #{} at {:.3}",
        cover3.cover_number(),
        nearest[0].id.index(),
        nearest[0].distance
    );
    assert_eq!(cover3.role(NodeId::new(0)).map(|r| r.is_attached()), Some(true));
}
