use super::bounds::Aabb;
use super::boundary::Boundary;
use super::particle::{Particle, Rgba};
use super::rigid_pair::RigidPair;
use super::vector::Vec2;

/// Stable handle of a body inside an [`Environment`](super::Environment) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Discriminator of the closed set of body variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Boundary,
    Particle,
    RigidPair,
}

/// Every simulated entity.
///
/// Pairwise behavior (`contact::touch`, `response::resolve`) dispatches on
/// `(kind, kind)` with an exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Boundary(Boundary),
    Particle(Particle),
    RigidPair(RigidPair),
}

impl Body {
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Boundary(_) => BodyKind::Boundary,
            Body::Particle(_) => BodyKind::Particle,
            Body::RigidPair(_) => BodyKind::RigidPair,
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, Body::Boundary(_))
    }

    pub fn bounds(&self) -> Aabb {
        match self {
            Body::Boundary(b) => b.bounds(),
            Body::Particle(p) => p.bounds(),
            Body::RigidPair(rp) => rp.bounds(),
        }
    }

    /// Integrate one frame. Boundaries do not move.
    pub fn advance(&mut self, dt: f64, gravity: f64) {
        match self {
            Body::Boundary(_) => {}
            Body::Particle(p) => p.advance(dt, gravity),
            Body::RigidPair(rp) => rp.advance(dt, gravity),
        }
    }

    pub fn record_trail(&mut self) {
        match self {
            Body::Boundary(_) => {}
            Body::Particle(p) => p.record_trail(),
            Body::RigidPair(rp) => rp.record_trail(),
        }
    }

    pub fn teflon(&self) -> bool {
        match self {
            Body::Boundary(b) => b.teflon,
            Body::Particle(p) => p.teflon,
            Body::RigidPair(rp) => rp.teflon(),
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            Body::Boundary(b) => b.color,
            Body::Particle(p) => p.color,
            Body::RigidPair(rp) => rp.color,
        }
    }

    /// Position of a moving body (centre of mass for pairs); `None` for boundaries.
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Body::Boundary(_) => None,
            Body::Particle(p) => Some(p.position()),
            Body::RigidPair(rp) => Some(rp.position()),
        }
    }

    pub fn velocity(&self) -> Option<Vec2> {
        match self {
            Body::Boundary(_) => None,
            Body::Particle(p) => Some(p.velocity()),
            Body::RigidPair(rp) => Some(rp.velocity()),
        }
    }

    pub fn mass(&self) -> Option<f64> {
        match self {
            Body::Boundary(_) => None,
            Body::Particle(p) => Some(p.mass()),
            Body::RigidPair(rp) => Some(rp.mass()),
        }
    }

    pub fn momentum(&self) -> Option<Vec2> {
        Some(self.velocity()? * self.mass()?)
    }

    /// Translational kinetic energy split by axis: `(m vx²/2, m vy²/2)`.
    pub fn axis_energies(&self) -> Option<(f64, f64)> {
        let v = self.velocity()?;
        let m = self.mass()?;
        Some((0.5 * m * v.x * v.x, 0.5 * m * v.y * v.y))
    }

    /// Rotational energy; zero for plain particles.
    pub fn rotational_energy(&self) -> Option<f64> {
        match self {
            Body::Boundary(_) => None,
            Body::Particle(_) => Some(0.0),
            Body::RigidPair(rp) => Some(rp.rotational_energy()),
        }
    }

    /// Translational plus rotational energy.
    pub fn energy(&self) -> Option<f64> {
        let (wx, wy) = self.axis_energies()?;
        Some(wx + wy + self.rotational_energy()?)
    }

    /// Flip the velocity of a moving body.
    pub fn reverse(&mut self) {
        match self {
            Body::Boundary(_) => {}
            Body::Particle(p) => p.state.velocity = -p.state.velocity,
            Body::RigidPair(rp) => rp.reverse(),
        }
    }

    pub fn as_boundary(&self) -> Option<&Boundary> {
        match self {
            Body::Boundary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_particle(&self) -> Option<&Particle> {
        match self {
            Body::Particle(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_rigid_pair(&self) -> Option<&RigidPair> {
        match self {
            Body::RigidPair(rp) => Some(rp),
            _ => None,
        }
    }
}

impl From<Boundary> for Body {
    fn from(b: Boundary) -> Self {
        Body::Boundary(b)
    }
}

impl From<Particle> for Body {
    fn from(p: Particle) -> Self {
        Body::Particle(p)
    }
}

impl From<RigidPair> for Body {
    fn from(rp: RigidPair) -> Self {
        Body::RigidPair(rp)
    }
}
