use std::collections::HashSet;

use billiard::core::contact::touch;
use billiard::core::grid::cell_size_for;
use billiard::core::{Aabb, Body, BodyId, Boundary, Particle, SpatialGrid, Vec2};
use proptest::prelude::*;

fn disc() -> impl Strategy<Value = (f64, f64, f64, f64, f64)> {
    (0.0..100.0f64, 0.0..100.0f64, 0.1..4.0f64, -3.0..3.0f64, -3.0..3.0f64)
}

fn bodies_from(discs: &[(f64, f64, f64, f64, f64)]) -> Vec<Body> {
    let mut bodies: Vec<Body> = vec![
        Boundary::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 4)
            .expect("valid wall")
            .into(),
        Boundary::new(Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0), 4)
            .expect("valid wall")
            .into(),
    ];
    bodies.extend(discs.iter().map(|&(x, y, r, vx, vy)| {
        Body::from(Particle::new(1.0, r, Vec2::new(x, y), Vec2::new(vx, vy)).expect("valid disc"))
    }));
    bodies
}

proptest! {
    /// Every touching pair is among the grid's candidates, exactly once.
    #[test]
    fn candidates_cover_every_contact(discs in prop::collection::vec(disc(), 1..60)) {
        let bodies = bodies_from(&discs);
        let area = Aabb::from_corners(Vec2::new(-10.0, -10.0), Vec2::new(110.0, 110.0));
        let mut grid = SpatialGrid::new(area, cell_size_for(&area, &bodies))
            .expect("valid grid");
        grid.rebuild(&bodies);
        let candidates = grid.candidate_pairs();
        let unique: HashSet<(BodyId, BodyId)> = candidates.iter().copied().collect();
        prop_assert_eq!(unique.len(), candidates.len());

        for i in 0..bodies.len() {
            for j in i + 1..bodies.len() {
                if touch(&bodies[i], &bodies[j]) {
                    let key = (BodyId(i as u32), BodyId(j as u32));
                    prop_assert!(unique.contains(&key), "missing contact {:?}", key);
                }
            }
        }
    }

    /// The pair test gives the same answer in either order.
    #[test]
    fn touch_is_commutative(discs in prop::collection::vec(disc(), 2..12)) {
        let bodies = bodies_from(&discs);
        for a in &bodies {
            for b in &bodies {
                prop_assert_eq!(touch(a, b), touch(b, a));
            }
        }
    }
}

/// Pairs that share several cells are still reported once, low id first.
#[test]
fn spanning_bodies_reported_once() -> billiard::Result<()> {
    let area = Aabb::from_corners(Vec2::ZERO, Vec2::new(40.0, 40.0));
    let mut grid = SpatialGrid::new(area, 5.0)?;
    let big = Body::from(Particle::new(1.0, 12.0, Vec2::new(20.0, 20.0), Vec2::ZERO)?);
    let small = Body::from(Particle::new(1.0, 9.0, Vec2::new(22.0, 21.0), Vec2::ZERO)?);
    grid.rebuild(&[small, big]);
    assert_eq!(grid.candidate_pairs(), vec![(BodyId(0), BodyId(1))]);
    Ok(())
}
