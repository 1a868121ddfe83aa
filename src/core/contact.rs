//! Narrow-phase contact predicates.
//!
//! `touch` is commutative: both argument orders reach the same predicate.
//! The two "teflon" rules (particle/particle and particle/boundary) are kept
//! as separate functions on purpose; they test different quantities.

use super::body::Body;
use super::boundary::Boundary;
use super::particle::Particle;
use super::rigid_pair::RigidPair;

/// Particle/particle: overlapping and not (teflon and already separating).
pub fn particle_particle(a: &Particle, b: &Particle) -> bool {
    let d = b.position() - a.position();
    let sum_r = a.radius() + b.radius();
    if d.length_squared() > sum_r * sum_r {
        return false;
    }
    let separating = (b.velocity() - a.velocity()).dot(d) > 0.0;
    !((a.teflon || b.teflon) && separating)
}

/// Particle/boundary: within `r` of the line, within the segment's extent
/// (plus `r`), and not (teflon and moving along the normal).
pub fn particle_boundary(p: &Particle, b: &Boundary) -> bool {
    let offset = p.position() - b.center();
    let n = b.normal();
    let distance = offset.project_on(n).abs();
    let distance_long = offset.cross(n).abs();
    if distance > p.radius() || distance_long > b.length() / 2.0 + p.radius() {
        return false;
    }
    let leaving = p.velocity().dot(n) > 0.0;
    !((p.teflon || b.teflon) && leaving)
}

/// A particle against any body.
pub fn particle_body(p: &Particle, other: &Body) -> bool {
    match other {
        Body::Boundary(b) => particle_boundary(p, b),
        Body::Particle(q) => particle_particle(p, q),
        Body::RigidPair(rp) => rigid_pair_touches_particle(rp, p),
    }
}

fn rigid_pair_touches_particle(rp: &RigidPair, p: &Particle) -> bool {
    rp.particles().iter().any(|c| particle_particle(c, p))
}

/// True contact test between two bodies.
pub fn touch(a: &Body, b: &Body) -> bool {
    match (a, b) {
        (Body::Boundary(_), Body::Boundary(_)) => false,
        (Body::Particle(p), other) | (other, Body::Particle(p)) => particle_body(p, other),
        (Body::RigidPair(rp), other) | (other, Body::RigidPair(rp)) => {
            rp.particles().iter().any(|c| particle_body(c, other))
        }
    }
}
