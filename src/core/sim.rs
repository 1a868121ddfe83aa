use std::time::{Duration, Instant};

use ordered_float::NotNan;
use tracing::{debug, instrument, trace};

use crate::core::body::{Body, BodyId};
use crate::core::boundary::Boundary;
use crate::core::bounds::Aabb;
use crate::core::grid::{cell_size_for, SpatialGrid};
use crate::core::vector::Vec2;
use crate::core::{contact, response};
use crate::error::{Error, Result};

/// Margin added around the walls' bounding box when sizing the grid.
pub const DEFAULT_GRID_MARGIN: f64 = 50.0;

/// Trails are sampled once every this many frames.
pub const DEFAULT_TRACE_FREQUENCY: u64 = 6;

/// Wall-clock time spent in each phase of `step`, summed over all frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimings {
    pub integrate: Duration,
    pub broad_phase: Duration,
    pub resolve: Duration,
}

/// Closed 2D environment: walls plus moving bodies, stepped frame by frame.
///
/// All bodies live in one arena; [`BodyId`] is the index. The grid only
/// holds ids and is rebuilt every frame.
#[derive(Debug)]
pub struct Environment {
    bodies: Vec<Body>,
    area: Aabb,
    grid_margin: f64,
    grid: SpatialGrid,
    frame: u64,
    time_now: f64,
    trace_frequency: u64,
    last_candidates: usize,
    last_contacts: usize,
    timings: PhaseTimings,
}

impl Environment {
    /// Build an environment from walls and moving bodies.
    ///
    /// `bodies` may also contain boundaries; they are kept in the given order
    /// after `boundaries`.
    ///
    /// Errors: `Error::InvalidParam` if there are no boundaries at all.
    pub fn new(boundaries: Vec<Boundary>, bodies: Vec<Body>) -> Result<Self> {
        Self::with_margin(boundaries, bodies, DEFAULT_GRID_MARGIN)
    }

    /// As [`Environment::new`] with an explicit grid margin.
    pub fn with_margin(
        boundaries: Vec<Boundary>,
        bodies: Vec<Body>,
        grid_margin: f64,
    ) -> Result<Self> {
        if !grid_margin.is_finite() || grid_margin < 0.0 {
            return Err(Error::InvalidParam("grid_margin must be finite and >= 0".into()));
        }
        let arena = assemble(boundaries, bodies)?;
        let (area, grid) = build_grid(&arena, grid_margin)?;
        let env = Self {
            bodies: arena,
            area,
            grid_margin,
            grid,
            frame: 0,
            time_now: 0.0,
            trace_frequency: DEFAULT_TRACE_FREQUENCY,
            last_candidates: 0,
            last_contacts: 0,
            timings: PhaseTimings::default(),
        };
        env.log_layout("environment built");
        Ok(env)
    }

    /// Close the polygon `vertices` into boundaries (last vertex joins the first).
    ///
    /// With `sort_vertices`, vertices are first ordered by angle around the
    /// centre of their bounding box.
    pub fn from_polygon(
        vertices: &[Vec2],
        sort_vertices: bool,
        stack_size: usize,
        bodies: Vec<Body>,
    ) -> Result<Self> {
        Self::new(polygon_boundaries(vertices, sort_vertices, stack_size)?, bodies)
    }

    /// Replace every body and wall, recomputing the grid and its cell size.
    ///
    /// On error the environment is left unchanged.
    pub fn replace(&mut self, boundaries: Vec<Boundary>, bodies: Vec<Body>) -> Result<()> {
        let arena = assemble(boundaries, bodies)?;
        let (area, grid) = build_grid(&arena, self.grid_margin)?;
        self.bodies = arena;
        self.area = area;
        self.grid = grid;
        self.last_candidates = 0;
        self.last_contacts = 0;
        self.log_layout("environment replaced");
        Ok(())
    }

    /// Add one body and re-derive the grid geometry.
    pub fn push_body(&mut self, body: impl Into<Body>) -> Result<BodyId> {
        let id = BodyId(u32::try_from(self.bodies.len()).map_err(|_| {
            Error::InvalidParam("too many bodies".into())
        })?);
        self.bodies.push(body.into());
        match build_grid(&self.bodies, self.grid_margin) {
            Ok((area, grid)) => {
                self.area = area;
                self.grid = grid;
                Ok(id)
            }
            Err(e) => {
                self.bodies.pop();
                Err(e)
            }
        }
    }

    pub fn set_trace_frequency(&mut self, every: u64) {
        self.trace_frequency = every.max(1);
    }

    /// Advance one frame: integrate, broad phase, narrow phase, resolve, commit wall pressure.
    ///
    /// Errors: `Error::InvalidParam` if `dt` is not finite and positive or
    /// `gravity` is not finite; nothing is mutated in that case.
    #[instrument(level = "trace", skip(self), fields(frame = self.frame))]
    pub fn step(&mut self, dt: f64, gravity: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidParam(format!("dt must be finite and > 0, got {dt}")));
        }
        if !gravity.is_finite() {
            return Err(Error::InvalidParam("gravity must be finite".into()));
        }

        let t0 = Instant::now();
        for body in &mut self.bodies {
            body.advance(dt, gravity);
        }
        self.frame += 1;
        self.time_now += dt;
        if self.frame % self.trace_frequency == 0 {
            for body in &mut self.bodies {
                body.record_trail();
            }
        }

        let t1 = Instant::now();
        self.grid.rebuild(&self.bodies);
        let candidates = self.grid.candidate_pairs();
        let contacts: Vec<(BodyId, BodyId)> = candidates
            .iter()
            .copied()
            .filter(|&(a, b)| contact::touch(&self.bodies[a.index()], &self.bodies[b.index()]))
            .collect();

        let t2 = Instant::now();
        for &(a, b) in &contacts {
            for id in [a, b] {
                if let Body::RigidPair(rp) = &mut self.bodies[id.index()] {
                    rp.decouple();
                }
            }
        }
        for &(a, b) in &contacts {
            let (first, second) = pair_mut(&mut self.bodies, a, b);
            response::resolve(first, second);
        }
        for body in &mut self.bodies {
            if let Body::Boundary(wall) = body {
                wall.commit_pressure(dt);
            }
        }
        let t3 = Instant::now();

        self.timings.integrate += t1 - t0;
        self.timings.broad_phase += t2 - t1;
        self.timings.resolve += t3 - t2;
        self.last_candidates = candidates.len();
        self.last_contacts = contacts.len();
        trace!(candidates = candidates.len(), contacts = contacts.len(), "frame stepped");
        Ok(())
    }

    /// Run `steps` frames with the same `dt` and `gravity`.
    pub fn run(&mut self, steps: usize, dt: f64, gravity: f64) -> Result<()> {
        for _ in 0..steps {
            self.step(dt, gravity)?;
        }
        Ok(())
    }

    /// Flip the velocity of every moving body.
    pub fn reverse_velocities(&mut self) {
        for body in &mut self.bodies {
            body.reverse();
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sum of all `dt` passed to `step`.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    pub fn timings(&self) -> PhaseTimings {
        self.timings
    }

    /// `(candidate pairs, true contacts)` of the last frame.
    pub fn last_frame_counts(&self) -> (usize, usize) {
        (self.last_candidates, self.last_contacts)
    }

    pub fn area(&self) -> Aabb {
        self.area
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &Boundary> {
        self.bodies.iter().filter_map(Body::as_boundary)
    }

    /// Moving bodies with their ids.
    pub fn moving(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_moving())
            .map(|(i, b)| (BodyId(i as u32), b))
    }

    pub fn num_moving(&self) -> usize {
        self.moving().count()
    }

    /// Mean pressure of every boundary, in arena order.
    pub fn pressures(&self) -> Vec<f64> {
        self.boundaries().map(Boundary::mean_pressure).collect()
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.bodies.iter().filter_map(Body::position).collect()
    }

    pub fn velocities(&self) -> Vec<Vec2> {
        self.bodies.iter().filter_map(Body::velocity).collect()
    }

    pub fn total_momentum(&self) -> Vec2 {
        self.bodies
            .iter()
            .filter_map(Body::momentum)
            .fold(Vec2::ZERO, |acc, p| acc + p)
    }

    /// Kinetic plus rotational energy of all moving bodies.
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().filter_map(Body::energy).sum()
    }

    /// Per-body energies of moving bodies, in arena order.
    pub fn energies(&self) -> Vec<f64> {
        self.bodies.iter().filter_map(Body::energy).collect()
    }

    fn log_layout(&self, what: &str) {
        let (cols, rows) = self.grid.dims();
        debug!(
            boundaries = self.boundaries().count(),
            moving = self.num_moving(),
            cell_size = self.grid.cell_size(),
            cols,
            rows,
            "{what}"
        );
    }
}

/// Walls first, then the remaining bodies in order.
fn assemble(boundaries: Vec<Boundary>, bodies: Vec<Body>) -> Result<Vec<Body>> {
    let mut arena: Vec<Body> = boundaries.into_iter().map(Body::Boundary).collect();
    arena.extend(bodies);
    if !arena.iter().any(|b| !b.is_moving()) {
        return Err(Error::InvalidParam("environment needs at least one boundary".into()));
    }
    if u32::try_from(arena.len()).is_err() {
        return Err(Error::InvalidParam("too many bodies".into()));
    }
    Ok(arena)
}

fn build_grid(arena: &[Body], margin: f64) -> Result<(Aabb, SpatialGrid)> {
    let walls = arena
        .iter()
        .filter_map(Body::as_boundary)
        .map(Boundary::bounds)
        .reduce(|a, b| a.union(&b))
        .ok_or_else(|| Error::InvalidParam("environment needs at least one boundary".into()))?;
    let area = walls.inflate(margin.max(f64::EPSILON));
    let cell_size = cell_size_for(&area, arena);
    let grid = SpatialGrid::new(area, cell_size)?;
    Ok((area, grid))
}

/// Closed polygon of boundaries through `vertices`.
///
/// Errors: `Error::InvalidParam` for fewer than two vertices or non-finite coordinates.
pub fn polygon_boundaries(
    vertices: &[Vec2],
    sort_vertices: bool,
    stack_size: usize,
) -> Result<Vec<Boundary>> {
    if vertices.len() < 2 {
        return Err(Error::InvalidParam("at least two vertices are required".into()));
    }
    let mut pts = vertices.to_vec();
    if sort_vertices {
        let center = pts
            .iter()
            .map(|&p| Aabb::from_corners(p, p))
            .reduce(|a, b| a.union(&b))
            .map(|bb| bb.center())
            .unwrap_or_default();
        let mut keyed = pts
            .iter()
            .map(|&p| {
                let d = p - center;
                NotNan::new(d.y.atan2(d.x))
                    .map(|angle| (angle, p))
                    .map_err(|_| Error::InvalidParam("vertex coordinates must be finite".into()))
            })
            .collect::<Result<Vec<_>>>()?;
        keyed.sort_by_key(|&(angle, _)| angle);
        pts = keyed.into_iter().map(|(_, p)| p).collect();
    }
    let n = pts.len();
    // A two-vertex "polygon" is a single segment, not a doubled one.
    let edges = if n == 2 { 1 } else { n };
    (0..edges)
        .map(|i| Boundary::new(pts[i], pts[(i + 1) % n], stack_size))
        .collect()
}

/// Two distinct mutable bodies from the arena.
fn pair_mut(bodies: &mut [Body], a: BodyId, b: BodyId) -> (&mut Body, &mut Body) {
    let (i, j) = (a.index(), b.index());
    debug_assert_ne!(i, j, "a body cannot collide with itself");
    if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::Particle;

    fn square(side: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(side, 0.0),
            Vec2::new(side, side),
            Vec2::new(0.0, side),
        ]
    }

    #[test]
    fn empty_boundaries_rejected() -> Result<()> {
        let ball = Particle::new(1.0, 1.0, Vec2::ZERO, Vec2::ZERO)?;
        let err = Environment::new(Vec::new(), vec![ball.into()]).unwrap_err();
        assert!(err.to_string().contains("boundary"));
        Ok(())
    }

    #[test]
    fn polygon_is_closed() -> Result<()> {
        let walls = polygon_boundaries(&square(10.0), false, 5)?;
        assert_eq!(walls.len(), 4);
        assert_eq!(walls[3].endpoints(), (Vec2::new(0.0, 10.0), Vec2::new(0.0, 0.0)));
        Ok(())
    }

    #[test]
    fn sorted_vertices_follow_angle() -> Result<()> {
        let shuffled = vec![
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ];
        let walls = polygon_boundaries(&shuffled, true, 5)?;
        let starts: Vec<Vec2> = walls.iter().map(|w| w.endpoints().0).collect();
        // atan2 order around (5, 5): (0,0) -135deg, (10,0) -45deg, (10,10) 45deg, (0,10) 135deg
        assert_eq!(starts, square(10.0));
        Ok(())
    }

    #[test]
    fn bad_dt_rejected_without_mutation() -> Result<()> {
        let ball = Particle::new(1.0, 1.0, Vec2::new(5.0, 5.0), Vec2::new(1.0, 0.0))?;
        let mut env = Environment::from_polygon(&square(10.0), false, 5, vec![ball.into()])?;
        assert!(env.step(0.0, 0.0).is_err());
        assert!(env.step(f64::NAN, 0.0).is_err());
        assert!(env.step(0.1, f64::INFINITY).is_err());
        assert_eq!(env.frame(), 0);
        assert_eq!(env.positions(), vec![Vec2::new(5.0, 5.0)]);
        Ok(())
    }

    #[test]
    fn push_body_extends_arena() -> Result<()> {
        let mut env = Environment::from_polygon(&square(10.0), false, 5, Vec::new())?;
        let id = env.push_body(Particle::new(1.0, 1.0, Vec2::new(5.0, 5.0), Vec2::ZERO)?)?;
        assert_eq!(id, BodyId(4));
        assert_eq!(env.num_moving(), 1);
        Ok(())
    }

    #[test]
    fn pair_mut_returns_requested_order() -> Result<()> {
        let mut bodies: Vec<Body> = (0..3)
            .map(|i| Particle::new(1.0 + i as f64, 1.0, Vec2::ZERO, Vec2::ZERO).map(Body::from))
            .collect::<Result<_>>()?;
        let (a, b) = pair_mut(&mut bodies, BodyId(2), BodyId(0));
        assert_eq!(a.mass(), Some(3.0));
        assert_eq!(b.mass(), Some(1.0));
        Ok(())
    }
}
