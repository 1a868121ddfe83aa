//! Collision responses. Callers only resolve pairs that `contact::touch` accepted.

use super::body::Body;
use super::boundary::Boundary;
use super::contact;
use super::particle::Particle;
use super::rigid_pair::RigidPair;

/// Elastic collision of two discs with unequal masses.
///
/// Solves momentum (both axes) and kinetic energy conservation along the
/// line of centres. Coincident centres fall back to an exchange along the
/// relative velocity with `m0 + m1` as divisor.
pub fn particle_particle(a: &mut Particle, b: &mut Particle) {
    let (ma, mb) = (a.mass(), b.mass());
    let d = a.position() - b.position();
    let dx2 = d.x * d.x;
    let dxy = d.x * d.y;
    let dy2 = d.y * d.y;
    let du = b.velocity() - a.velocity();

    let divisor = (dx2 + dy2) * (ma + mb);
    let (dv, divisor) = if divisor != 0.0 {
        let dvx = dx2 * du.x + dxy * du.y;
        let dvy = dxy * du.x + dy2 * du.y;
        (super::Vec2::new(dvx, dvy), divisor)
    } else {
        (du, ma + mb)
    };

    a.state.velocity += dv * (2.0 * mb / divisor);
    b.state.velocity -= dv * (2.0 * ma / divisor);
}

/// Mirror reflection on an infinitely heavy wall; the wall records the momentum it received.
pub fn particle_boundary(p: &mut Particle, b: &mut Boundary) {
    let n = b.normal();
    let dot = p.velocity().dot(n);
    p.state.velocity -= n * (2.0 * dot);
    b.add_impulse(n * (2.0 * p.mass() * dot));
}

/// Resolve a particle against any body.
pub fn particle_body(p: &mut Particle, other: &mut Body) {
    match other {
        Body::Boundary(b) => particle_boundary(p, b),
        Body::Particle(q) => particle_particle(p, q),
        Body::RigidPair(rp) => {
            for c in rp.particles_mut() {
                if contact::particle_particle(c, p) {
                    particle_particle(c, p);
                }
            }
            rp.recouple();
        }
    }
}

/// Resolve every constituent of `rp` touching `other`, then recouple the pair.
fn rigid_pair_body(rp: &mut RigidPair, other: &mut Body) {
    for c in rp.particles_mut() {
        if contact::particle_body(c, other) {
            particle_body(c, other);
        }
    }
    rp.recouple();
}

/// Apply the collision response for a touching pair.
pub fn resolve(a: &mut Body, b: &mut Body) {
    match (a, b) {
        (Body::Boundary(_), Body::Boundary(_)) => {}
        (Body::Particle(p), other) | (other, Body::Particle(p)) => particle_body(p, other),
        (Body::RigidPair(rp), other) | (other, Body::RigidPair(rp)) => rigid_pair_body(rp, other),
    }
}
