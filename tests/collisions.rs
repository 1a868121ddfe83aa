use approx::assert_abs_diff_eq;
use billiard::core::{Aabb, Body, Environment, Particle, Vec2};
use billiard::scene::scatter_particles;

fn square(side: f64) -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(side, 0.0),
        Vec2::new(side, side),
        Vec2::new(0.0, side),
    ]
}

/// Head-on collision of masses 1 and 3: both conservation laws hold and the
/// discs separate afterwards without a second contact.
#[test]
fn unequal_masses_head_on() -> billiard::Result<()> {
    let a = Particle::new(1.0, 1.0, Vec2::new(40.0, 50.0), Vec2::new(2.0, 0.0))?;
    let b = Particle::new(3.0, 1.0, Vec2::new(44.0, 50.0), Vec2::new(-2.0, 0.0))?;
    let mut env = Environment::from_polygon(&square(100.0), false, 10, vec![a.into(), b.into()])?;
    let p0 = env.total_momentum();
    let e0 = env.kinetic_energy();

    env.run(10, 0.1, 0.0)?;

    let v = env.velocities();
    assert_abs_diff_eq!(v[0].x, -4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(v[1].x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(v[0].y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(env.total_momentum().x, p0.x, epsilon = 1e-9);
    assert_abs_diff_eq!(env.kinetic_energy(), e0, epsilon = 1e-9);

    let pos = env.positions();
    let approach = (v[1] - v[0]).dot(pos[1] - pos[0]);
    assert!(approach > 0.0, "discs must be separating, got {approach}");

    let gap = pos[0].distance(pos[1]);
    env.run(10, 0.1, 0.0)?;
    let pos = env.positions();
    assert!(pos[0].distance(pos[1]) > gap);
    assert_eq!(env.velocities(), v, "no further contact expected");
    Ok(())
}

/// Mass 2 at speed 5 into the wall with normal (-1, 0): velocity reverses and
/// the wall records 2 * 2 * 5 = 20 of normal momentum for that frame.
#[test]
fn wall_strike_reverses_and_records_pressure() -> billiard::Result<()> {
    let ball = Particle::new(2.0, 1.0, Vec2::new(8.6, 5.0), Vec2::new(5.0, 0.0))?;
    let mut env = Environment::from_polygon(&square(10.0), false, 4, vec![ball.into()])?;
    let right = env.boundaries().nth(1).map(|w| w.normal());
    assert_eq!(right, Some(Vec2::new(-1.0, 0.0)));

    env.step(0.1, 0.0)?;

    assert_eq!(env.velocities(), vec![Vec2::new(-5.0, 0.0)]);
    let pressures = env.pressures();
    assert_eq!(pressures.len(), 4);
    // 20 / dt / length
    assert_abs_diff_eq!(pressures[1], 20.0, epsilon = 1e-9);
    for k in [0, 2, 3] {
        assert_eq!(pressures[k], 0.0);
    }
    Ok(())
}

/// Pressure is a sliding mean: a quiet frame halves a one-hit history.
#[test]
fn pressure_mean_decays_over_quiet_frames() -> billiard::Result<()> {
    let ball = Particle::new(2.0, 1.0, Vec2::new(8.6, 5.0), Vec2::new(5.0, 0.0))?;
    let mut env = Environment::from_polygon(&square(10.0), false, 4, vec![ball.into()])?;
    env.step(0.1, 0.0)?;
    env.step(0.1, 0.0)?;
    assert_abs_diff_eq!(env.pressures()[1], 10.0, epsilon = 1e-9);
    env.run(2, 0.1, 0.0)?;
    assert_abs_diff_eq!(env.pressures()[1], 5.0, epsilon = 1e-9);
    // window of 4 is full; the hit is evicted on the next commit
    env.step(0.1, 0.0)?;
    assert_eq!(env.pressures()[1], 0.0);
    Ok(())
}

/// A dilute gas of discs in a box conserves kinetic energy without gravity.
#[test]
fn energy_conserved_in_closed_box() -> billiard::Result<()> {
    let area = Aabb::from_corners(Vec2::ZERO, Vec2::new(100.0, 100.0));
    let balls = scatter_particles(area, 60, 1.0, 1.0, 3.0, Some(12345))?;
    let bodies: Vec<Body> = balls.into_iter().map(Body::from).collect();
    let mut env = Environment::from_polygon(&square(100.0), false, 50, bodies)?;
    let e0 = env.kinetic_energy();

    env.run(500, 0.02, 0.0)?;

    let e1 = env.kinetic_energy();
    let rel = ((e1 - e0) / e0).abs();
    assert!(rel < 1e-9, "relative energy drift {rel} too large (E0={e0}, E1={e1})");
    let (candidates, contacts) = env.last_frame_counts();
    assert!(contacts <= candidates);
    billiard::diagnostics::check_state(&env)?;
    Ok(())
}

/// Free fall follows y0 + g t^2 / 2 while x stays put.
#[test]
fn gravity_integrates_exactly() -> billiard::Result<()> {
    let ball = Particle::new(1.0, 1.0, Vec2::new(50.0, 10.0), Vec2::ZERO)?;
    let mut env = Environment::from_polygon(&square(100.0), false, 10, vec![ball.into()])?;
    env.run(20, 0.1, 9.8)?;
    let t = env.time();
    assert_abs_diff_eq!(t, 2.0, epsilon = 1e-12);
    let p = env.positions()[0];
    assert_abs_diff_eq!(p.x, 50.0, epsilon = 1e-12);
    assert_abs_diff_eq!(p.y, 10.0 + 0.5 * 9.8 * t * t, epsilon = 1e-9);
    assert_abs_diff_eq!(env.velocities()[0].y, 9.8 * t, epsilon = 1e-9);
    Ok(())
}

/// Reversing every velocity flips total momentum.
#[test]
fn reverse_velocities_flips_momentum() -> billiard::Result<()> {
    let area = Aabb::from_corners(Vec2::ZERO, Vec2::new(50.0, 50.0));
    let bodies: Vec<Body> = scatter_particles(area, 10, 1.0, 2.0, 1.0, Some(3))?
        .into_iter()
        .map(Body::from)
        .collect();
    let mut env = Environment::from_polygon(&square(50.0), false, 10, bodies)?;
    let p0 = env.total_momentum();
    env.reverse_velocities();
    assert_eq!(env.total_momentum(), -p0);
    Ok(())
}
