use std::collections::VecDeque;

use super::bounds::Aabb;
use super::vector::Vec2;
use crate::error::{Error, Result};

/// RGBA color carried through for renderers and the scene format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const BLUE: Self = Self([0, 0, 255, 255]);
    pub const GRAY: Self = Self([160, 160, 164, 255]);
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLUE
    }
}

/// Position and velocity of a point mass under uniform gravity along +y.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointMass {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl PointMass {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Exact constant-acceleration update over `dt`.
    #[inline]
    pub fn advance(&mut self, dt: f64, gravity: f64) {
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt + 0.5 * gravity * dt * dt;
        self.velocity.y += gravity * dt;
    }
}

/// Bounded history of past positions, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn push(&mut self, p: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &Vec2> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

}

/// A hard disc (or pure point when `radius == 0`).
///
/// Fields:
/// - `state`: position and velocity
/// - `radius`: disc radius (>= 0)
/// - `mass`: mass (> 0)
/// - `teflon`: suppress contacts that are already separating
/// - `trail`: optional bounded position history
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub state: PointMass,
    radius: f64,
    mass: f64,
    pub teflon: bool,
    pub color: Rgba,
    pub trail: Option<Trail>,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `mass` is non-positive, `radius` is negative, or any
    ///   component is NaN/inf.
    pub fn new(mass: f64, radius: f64, position: Vec2, velocity: Vec2) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidParam("radius must be finite and >= 0".into()));
        }
        if !position.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            state: PointMass::new(position, velocity),
            radius,
            mass,
            teflon: true,
            color: Rgba::default(),
            trail: None,
        })
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_teflon(mut self, teflon: bool) -> Self {
        self.teflon = teflon;
        self
    }

    /// Enable a position trail holding at most `capacity` samples.
    #[must_use]
    pub fn with_trail(mut self, capacity: usize) -> Self {
        self.trail = Some(Trail::new(capacity));
        self
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.state.velocity
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::around(self.state.position, self.radius)
    }

    #[inline]
    pub fn momentum(&self) -> Vec2 {
        self.state.velocity * self.mass
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.state.velocity.length_squared()
    }

    pub fn advance(&mut self, dt: f64, gravity: f64) {
        self.state.advance(dt, gravity);
    }

    pub fn record_trail(&mut self) {
        let p = self.state.position;
        if let Some(trail) = self.trail.as_mut() {
            trail.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_ok() -> Result<()> {
        let p = Particle::new(2.0, 0.5, Vec2::new(0.0, 1.0), Vec2::new(2.0, -3.0))?;
        assert_eq!(p.position(), Vec2::new(0.0, 1.0));
        assert_eq!(p.velocity(), Vec2::new(2.0, -3.0));
        assert_eq!(p.radius(), 0.5);
        assert_eq!(p.mass(), 2.0);
        assert!(p.teflon);
        assert!(p.trail.is_none());
        Ok(())
    }

    #[test]
    fn point_particle_allowed() -> Result<()> {
        let p = Particle::new(1.0, 0.0, Vec2::ZERO, Vec2::ZERO)?;
        assert_eq!(p.bounds().width(), 0.0);
        Ok(())
    }

    #[test]
    fn invalid_radius_rejected() {
        let err = Particle::new(1.0, -1.0, Vec2::ZERO, Vec2::ZERO).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn invalid_mass_rejected() {
        let err = Particle::new(0.0, 1.0, Vec2::ZERO, Vec2::ZERO).unwrap_err();
        assert!(err.to_string().contains("mass"));
        let err = Particle::new(f64::NAN, 1.0, Vec2::ZERO, Vec2::ZERO).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn kinetic_energy_computed() -> Result<()> {
        // v = (3,4), |v|^2 = 25; KE = 0.5 * m * 25
        let p = Particle::new(2.0, 1.0, Vec2::ZERO, Vec2::new(3.0, 4.0))?;
        assert!((p.kinetic_energy() - 25.0).abs() < 1e-12);
        assert_eq!(p.momentum(), Vec2::new(6.0, 8.0));
        Ok(())
    }

    #[test]
    fn advance_under_gravity() -> Result<()> {
        let mut p = Particle::new(1.0, 1.0, Vec2::ZERO, Vec2::new(1.0, 0.0))?;
        p.advance(2.0, 10.0);
        assert_eq!(p.position(), Vec2::new(2.0, 20.0));
        assert_eq!(p.velocity(), Vec2::new(1.0, 20.0));
        Ok(())
    }

    #[test]
    fn trail_is_bounded() -> Result<()> {
        let mut p = Particle::new(1.0, 1.0, Vec2::ZERO, Vec2::new(1.0, 0.0))?.with_trail(3);
        for _ in 0..5 {
            p.advance(1.0, 0.0);
            p.record_trail();
        }
        let trail = p.trail.as_ref().expect("trail enabled");
        assert_eq!(trail.len(), 3);
        let xs: Vec<f64> = trail.points().map(|q| q.x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0]);
        Ok(())
    }
}
