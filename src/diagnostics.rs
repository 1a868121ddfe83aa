//! Statistics over engine state for plot/histogram consumers.
//!
//! The engine does not guard against NaN/inf; these helpers are where such
//! values get caught.

use crate::core::{Environment, Vec2};
use crate::error::{Error, Result};

/// `(edges, counts)` with `bins + 1` edges.
pub type Histogram = (Vec<f64>, Vec<f64>);

/// Fail if any value is NaN or infinite, naming the first offender.
pub fn ensure_finite(label: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::Diagnostic(format!(
            "{label}[{i}] is not finite ({})",
            values[i]
        ))),
        None => Ok(()),
    }
}

/// Fixed-width histogram.
///
/// Without `range` the data min/max is used; a degenerate range is widened
/// by 0.5 on each side. Values outside `range` are dropped; the upper edge
/// is inclusive.
pub fn histogram(values: &[f64], bins: usize, range: Option<(f64, f64)>) -> Result<Histogram> {
    if bins == 0 {
        return Err(Error::InvalidParam("bins must be > 0".into()));
    }
    ensure_finite("values", values)?;
    let (mut lo, mut hi) = match range {
        Some((lo, hi)) => {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(Error::InvalidParam("range must be finite with min < max".into()));
            }
            (lo, hi)
        }
        None => {
            if values.is_empty() {
                return Err(Error::Diagnostic("no samples to histogram".into()));
            }
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
        }
    };
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|k| lo + width * k as f64).collect();
    let mut counts = vec![0.0; bins];
    for &v in values {
        if v < lo || v > hi {
            continue;
        }
        let k = (((v - lo) / width) as usize).min(bins - 1);
        counts[k] += 1.0;
    }
    Ok((edges, counts))
}

/// Histogram of per-body energies (translational + rotational).
pub fn energy_histogram(
    env: &Environment,
    bins: usize,
    range: Option<(f64, f64)>,
) -> Result<Histogram> {
    histogram(&env.energies(), bins, range)
}

/// Histogram of one velocity component (`axis` 0 = x, 1 = y) over moving bodies.
pub fn velocity_histogram(
    env: &Environment,
    axis: usize,
    bins: usize,
    range: Option<(f64, f64)>,
) -> Result<Histogram> {
    let pick: fn(Vec2) -> f64 = match axis {
        0 => |v| v.x,
        1 => |v| v.y,
        _ => return Err(Error::InvalidParam(format!("axis must be 0 or 1, got {axis}"))),
    };
    let values: Vec<f64> = env.velocities().into_iter().map(pick).collect();
    histogram(&values, bins, range)
}

/// Check energies, momenta and wall pressures for NaN/inf.
pub fn check_state(env: &Environment) -> Result<()> {
    ensure_finite("energy", &env.energies())?;
    let p = env.total_momentum();
    ensure_finite("momentum", &[p.x, p.y])?;
    ensure_finite("pressure", &env.pressures())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Body, Particle};

    #[test]
    fn counts_sum_to_samples() -> Result<()> {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0];
        let (edges, counts) = histogram(&values, 4, None)?;
        assert_eq!(edges.len(), 5);
        assert_eq!(counts, vec![2.0, 0.0, 1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn nan_is_reported() {
        let err = histogram(&[1.0, f64::NAN], 4, None).unwrap_err();
        assert!(err.to_string().contains("values[1]"));
    }

    #[test]
    fn constant_data_gets_unit_range() -> Result<()> {
        let (edges, counts) = histogram(&[2.0, 2.0], 2, None)?;
        assert_eq!(edges, vec![1.5, 2.0, 2.5]);
        assert_eq!(counts, vec![0.0, 2.0]);
        Ok(())
    }

    #[test]
    fn velocity_histogram_picks_axis() -> Result<()> {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(0.0, 20.0),
        ];
        let bodies = [(-1.0, 3.0), (0.0, 3.0), (1.0, -3.0)]
            .iter()
            .enumerate()
            .map(|(i, &(vx, vy))| {
                let pos = Vec2::new(5.0 + 5.0 * i as f64, 10.0);
                Particle::new(1.0, 1.0, pos, Vec2::new(vx, vy)).map(Body::from)
            })
            .collect::<Result<Vec<_>>>()?;
        let env = Environment::from_polygon(&square, false, 4, bodies)?;

        let (edges, counts) = velocity_histogram(&env, 0, 2, Some((-1.0, 1.0)))?;
        assert_eq!(edges, vec![-1.0, 0.0, 1.0]);
        assert_eq!(counts, vec![1.0, 2.0]);
        let (_, counts) = velocity_histogram(&env, 1, 2, None)?;
        assert_eq!(counts, vec![1.0, 2.0]);
        assert!(velocity_histogram(&env, 2, 2, None).is_err());
        Ok(())
    }

    #[test]
    fn explicit_range_drops_outliers() -> Result<()> {
        let (_, counts) = histogram(&[-5.0, 0.25, 0.75, 5.0], 2, Some((0.0, 1.0)))?;
        assert_eq!(counts, vec![1.0, 1.0]);
        Ok(())
    }
}
