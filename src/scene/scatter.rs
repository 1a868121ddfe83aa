use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::warn;

use crate::core::{Aabb, Particle, Vec2};
use crate::error::{Error, Result};

const MAX_ATTEMPTS: usize = 1_000_000;

/// Place `count` identical discs inside `area` without overlap.
///
/// Positions are rejection-sampled within `[min + radius, max - radius]`;
/// velocity components are uniform in `[-speed, speed]`. `seed = None`
/// draws a fresh seed.
pub fn scatter_particles(
    area: Aabb,
    count: usize,
    radius: f64,
    mass: f64,
    speed: f64,
    seed: Option<u64>,
) -> Result<Vec<Particle>> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(Error::InvalidParam("speed must be finite and >= 0".into()));
    }
    if !radius.is_finite() || radius < 0.0 {
        return Err(Error::InvalidParam("radius must be finite and >= 0".into()));
    }
    if area.width() < 2.0 * radius || area.height() < 2.0 * radius {
        return Err(Error::InvalidParam(
            "area must be at least 2 * radius in every dimension".into(),
        ));
    }

    let mut rng: StdRng = match seed {
        Some(s) => SeedableRng::seed_from_u64(s),
        None => SeedableRng::seed_from_u64(rng().random()),
    };

    let mut placed: Vec<Particle> = Vec::with_capacity(count);
    for id in 0..count {
        let mut attempts = 0usize;
        let pos = loop {
            if attempts >= MAX_ATTEMPTS {
                warn!(placed = placed.len(), requested = count, "particle scatter gave up");
                return Err(Error::InvalidParam(format!(
                    "failed to place particle {id} without overlap; try fewer particles or smaller radius"
                )));
            }
            attempts += 1;
            let pos = Vec2::new(
                rng.random_range(area.min.x + radius..=area.max.x - radius),
                rng.random_range(area.min.y + radius..=area.max.y - radius),
            );
            if !overlaps_existing(&placed, pos, radius) {
                break pos;
            }
        };
        let vel = if speed > 0.0 {
            Vec2::new(rng.random_range(-speed..=speed), rng.random_range(-speed..=speed))
        } else {
            Vec2::ZERO
        };
        placed.push(Particle::new(mass, radius, pos, vel)?);
    }
    Ok(placed)
}

fn overlaps_existing(existing: &[Particle], pos: Vec2, radius: f64) -> bool {
    existing.iter().any(|p| {
        let min = p.radius() + radius;
        (p.position() - pos).length_squared() < min * min
    })
}
