//! Two particles held at a fixed distance by a hidden rigid bond.
//!
//! While [`PairMode::Coupled`] the pair moves as a centre-of-mass point plus
//! a rigid rotation driven by `lz`. A contact switches it to
//! [`PairMode::Decoupled`] so the constituents can be resolved as ordinary
//! particles; [`RigidPair::recouple`] then folds their velocities back into
//! centre-of-mass velocity and angular momentum.

use super::bounds::Aabb;
use super::particle::{PointMass, Rgba, Trail};
use super::vector::Vec2;
use crate::error::{Error, Result};

/// Integration mode of a [`RigidPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairMode {
    /// Rigid rotation is being integrated from `lz`.
    Coupled,
    /// Constituents move independently until the next [`RigidPair::recouple`].
    Decoupled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidPair {
    particles: [super::Particle; 2],
    com: PointMass,
    lz: f64,
    mu: f64,
    inertia: f64,
    separation: f64,
    mode: PairMode,
    pub color: Rgba,
    pub trail: Option<Trail>,
}

impl RigidPair {
    /// Bond two particles at their current separation.
    ///
    /// Velocity along the bond is removed so the pair starts rigid.
    ///
    /// Errors: `Error::InvalidParam` if the particles coincide.
    pub fn new(a: super::Particle, b: super::Particle) -> Result<Self> {
        let separation = a.position().distance(b.position());
        if !(separation > 0.0 && separation.is_finite()) {
            return Err(Error::InvalidParam(
                "rigid pair constituents must be at distinct positions".into(),
            ));
        }
        let mu = a.mass() * b.mass() / (a.mass() + b.mass());
        let mut pair = Self {
            particles: [a, b],
            com: PointMass::default(),
            lz: 0.0,
            mu,
            inertia: mu * separation * separation,
            separation,
            mode: PairMode::Coupled,
            color: Rgba::GRAY,
            trail: None,
        };
        pair.recouple();
        Ok(pair)
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the teflon flag of both constituents; contacts read it from them.
    #[must_use]
    pub fn with_teflon(mut self, teflon: bool) -> Self {
        for particle in &mut self.particles {
            particle.teflon = teflon;
        }
        self
    }

    /// True when both constituents are teflon.
    pub fn teflon(&self) -> bool {
        self.particles.iter().all(|p| p.teflon)
    }

    #[must_use]
    pub fn with_trail(mut self, capacity: usize) -> Self {
        self.trail = Some(Trail::new(capacity));
        self
    }

    pub fn particles(&self) -> &[super::Particle; 2] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [super::Particle; 2] {
        &mut self.particles
    }

    pub fn mode(&self) -> PairMode {
        self.mode
    }

    pub fn angular_momentum(&self) -> f64 {
        self.lz
    }

    pub fn reduced_mass(&self) -> f64 {
        self.mu
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Fixed bond length `d`.
    pub fn separation(&self) -> f64 {
        self.separation
    }

    /// Current constituent distance; equals `separation()` up to rounding.
    pub fn current_separation(&self) -> f64 {
        self.particles[0].position().distance(self.particles[1].position())
    }

    pub fn mass(&self) -> f64 {
        self.particles[0].mass() + self.particles[1].mass()
    }

    pub fn position(&self) -> Vec2 {
        self.com.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.com.velocity
    }

    pub fn momentum(&self) -> Vec2 {
        self.com.velocity * self.mass()
    }

    pub fn translational_energy(&self) -> f64 {
        0.5 * self.mass() * self.com.velocity.length_squared()
    }

    /// `lz^2 / 2I`.
    pub fn rotational_energy(&self) -> f64 {
        self.lz * self.lz / self.inertia / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        self.particles[0].bounds().union(&self.particles[1].bounds())
    }

    /// Entry action of a contact: constituents are released from the bond.
    pub fn decouple(&mut self) {
        self.mode = PairMode::Decoupled;
    }

    /// Exit action of a contact.
    ///
    /// Removes the stretching component of the relative velocity with a
    /// reduced-mass impulse along the bond, then recomputes centre-of-mass
    /// position/velocity and `lz` from the constituents.
    pub fn recouple(&mut self) {
        let [p0, p1] = &mut self.particles;
        let (m0, m1) = (p0.mass(), p1.mass());
        let d = p1.position() - p0.position();

        let dv = p1.velocity() - p0.velocity();
        let dp = self.mu * dv.dot(d) / (self.separation * self.separation);
        p1.state.velocity -= d * (dp / m1);
        p0.state.velocity += d * (dp / m0);

        let total = m0 + m1;
        self.com.position = (p0.position() * m0 + p1.position() * m1) * (1.0 / total);
        self.com.velocity = (p0.velocity() * m0 + p1.velocity() * m1) * (1.0 / total);

        let dv = p1.velocity() - p0.velocity();
        self.lz = self.mu * (d.y * dv.x - d.x * dv.y);
        self.mode = PairMode::Coupled;
    }

    /// Advance one frame as a rigid body.
    pub fn advance(&mut self, dt: f64, gravity: f64) {
        if self.mode == PairMode::Decoupled {
            self.recouple();
        }
        self.com.advance(dt, gravity);

        let (m0, m1) = (self.particles[0].mass(), self.particles[1].mass());
        let c0 = self.mu / m0;
        let c1 = self.mu / m1;
        let omega = self.lz / self.inertia;
        let (sin, cos) = (dt * omega).sin_cos();

        let rel = self.particles[1].position() - self.particles[0].position();
        let mut rot = Vec2::new(rel.x * cos + rel.y * sin, -rel.x * sin + rel.y * cos);
        let len = rot.length();
        if len > 0.0 {
            rot = rot * (self.separation / len);
        }

        let com = self.com;
        let spin = Vec2::new(-rot.y, rot.x) * omega;
        let [p0, p1] = &mut self.particles;
        p0.state.position = com.position - rot * c0;
        p1.state.position = com.position + rot * c1;
        p0.state.velocity = com.velocity + spin * c0;
        p1.state.velocity = com.velocity - spin * c1;
    }

    pub fn record_trail(&mut self) {
        let p = self.com.position;
        if let Some(trail) = self.trail.as_mut() {
            trail.push(p);
        }
        for particle in &mut self.particles {
            particle.record_trail();
        }
    }

    /// Flip every velocity; `lz` changes sign with them.
    pub fn reverse(&mut self) {
        for particle in &mut self.particles {
            particle.state.velocity = -particle.state.velocity;
        }
        self.recouple();
    }
}

#[cfg(test)]
mod tests {
    use super::super::Particle;
    use super::*;

    fn ball(m: f64, x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle::new(m, 1.0, Vec2::new(x, y), Vec2::new(vx, vy)).expect("valid ball")
    }

    #[test]
    fn derived_quantities() -> Result<()> {
        let pair = RigidPair::new(ball(1.0, 0.0, 0.0, 0.0, 0.0), ball(3.0, 4.0, 0.0, 0.0, 0.0))?;
        assert_eq!(pair.separation(), 4.0);
        assert!((pair.reduced_mass() - 0.75).abs() < 1e-12);
        assert!((pair.inertia() - 12.0).abs() < 1e-12);
        assert_eq!(pair.position(), Vec2::new(3.0, 0.0));
        assert_eq!(pair.mode(), PairMode::Coupled);
        Ok(())
    }

    #[test]
    fn coincident_constituents_rejected() {
        let err = RigidPair::new(ball(1.0, 1.0, 1.0, 0.0, 0.0), ball(1.0, 1.0, 1.0, 0.0, 0.0))
            .unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn stretching_velocity_is_removed() -> Result<()> {
        // Pulling apart along the bond carries no angular momentum and is cancelled.
        let pair = RigidPair::new(ball(1.0, 0.0, 0.0, -1.0, 0.0), ball(1.0, 2.0, 0.0, 1.0, 0.0))?;
        assert_eq!(pair.angular_momentum(), 0.0);
        for p in pair.particles() {
            assert!(p.velocity().length() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn spinning_pair_keeps_separation() -> Result<()> {
        let mut pair =
            RigidPair::new(ball(1.0, 0.0, 0.0, 0.0, -1.0), ball(2.0, 3.0, 0.0, 0.0, 1.0))?;
        assert!(pair.angular_momentum() != 0.0);
        let lz = pair.angular_momentum();
        for _ in 0..1000 {
            pair.advance(0.01, 0.0);
            assert!((pair.current_separation() - 3.0).abs() < 1e-9);
        }
        assert!((pair.angular_momentum() - lz).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn decoupled_pair_resyncs_before_moving() -> Result<()> {
        let mut pair =
            RigidPair::new(ball(1.0, 0.0, 0.0, 0.0, 0.0), ball(1.0, 2.0, 0.0, 0.0, 0.0))?;
        pair.decouple();
        pair.particles_mut()[1].state.velocity = Vec2::new(0.0, 2.0);
        pair.advance(0.001, 0.0);
        assert_eq!(pair.mode(), PairMode::Coupled);
        assert!((pair.velocity().y - 1.0).abs() < 1e-12);
        assert!((pair.angular_momentum() + 2.0).abs() < 1e-12);
        Ok(())
    }
}
