//! Whitespace-separated scene records, one entity per line.
//!
//! ```text
//! Border   R G B A teflon x1 y1 x2 y2 stack_size
//! Ball     R G B A teflon x y vx vy trace m r
//! Dumbbell R G B A teflon x y vx vy trace  (R G B A teflon m r x y vx vy) x 2
//! ```
//!
//! `teflon` and `trace` are `0`/`1`. For `Dumbbell` the centre-of-mass
//! fields and the pair-level `teflon` are informational; the pair is
//! rebuilt from its two constituents, each carrying its own colour and flag.
//! Blank lines and `#` comments are skipped.

use std::fmt::Write as _;
use std::str::{FromStr, SplitWhitespace};

use super::Scene;
use crate::core::{Body, Boundary, Environment, Particle, RigidPair, Rgba, Vec2};
use crate::error::{Error, Result};

/// Serialize every wall and moving body of `env`.
pub fn write_scene(env: &Environment) -> String {
    let mut out = String::new();
    for body in env.bodies() {
        // Writing into a String cannot fail.
        let _ = write_record(&mut out, body);
    }
    out
}

fn write_record(out: &mut String, body: &Body) -> std::fmt::Result {
    let [r, g, b, a] = body.color().0;
    let teflon = u8::from(body.teflon());
    match body {
        Body::Boundary(wall) => {
            let (p1, p2) = wall.endpoints();
            writeln!(
                out,
                "Border {r} {g} {b} {a} {teflon} {} {} {} {} {}",
                p1.x,
                p1.y,
                p2.x,
                p2.y,
                wall.stack_size()
            )
        }
        Body::Particle(p) => {
            let (pos, vel) = (p.position(), p.velocity());
            writeln!(
                out,
                "Ball {r} {g} {b} {a} {teflon} {} {} {} {} {} {} {}",
                pos.x,
                pos.y,
                vel.x,
                vel.y,
                u8::from(p.trail.is_some()),
                p.mass(),
                p.radius()
            )
        }
        Body::RigidPair(rp) => {
            let (pos, vel) = (rp.position(), rp.velocity());
            write!(
                out,
                "Dumbbell {r} {g} {b} {a} {teflon} {} {} {} {} {}",
                pos.x,
                pos.y,
                vel.x,
                vel.y,
                u8::from(rp.trail.is_some())
            )?;
            for c in rp.particles() {
                let [cr, cg, cb, ca] = c.color.0;
                let (cp, cv) = (c.position(), c.velocity());
                write!(
                    out,
                    " {cr} {cg} {cb} {ca} {} {} {} {} {} {} {}",
                    u8::from(c.teflon),
                    c.mass(),
                    c.radius(),
                    cp.x,
                    cp.y,
                    cv.x,
                    cv.y
                )?;
            }
            writeln!(out)
        }
    }
}

/// Parse scene text; bodies with `trace = 1` get a trail of `trace_length` samples.
pub fn parse_scene(text: &str, trace_length: usize) -> Result<Scene> {
    let mut scene = Scene::default();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut rec = Record {
            fields: line.split_whitespace(),
            line: idx + 1,
        };
        let tag = rec.text()?;
        let color = Rgba([rec.num()?, rec.num()?, rec.num()?, rec.num()?]);
        let teflon = rec.flag()?;
        match tag {
            "Border" => {
                let p1 = Vec2::new(rec.num()?, rec.num()?);
                let p2 = Vec2::new(rec.num()?, rec.num()?);
                let stack_size = rec.num()?;
                let wall = rec.check(Boundary::new(p1, p2, stack_size))?;
                scene
                    .boundaries
                    .push(wall.with_color(color).with_teflon(teflon));
            }
            "Ball" => {
                let pos = Vec2::new(rec.num()?, rec.num()?);
                let vel = Vec2::new(rec.num()?, rec.num()?);
                let trace = rec.flag()?;
                let (m, r) = (rec.num()?, rec.num()?);
                let mut ball = rec
                    .check(Particle::new(m, r, pos, vel))?
                    .with_color(color)
                    .with_teflon(teflon);
                if trace {
                    ball = ball.with_trail(trace_length);
                }
                scene.bodies.push(ball.into());
            }
            "Dumbbell" => {
                for _ in 0..4 {
                    rec.num::<f64>()?;
                }
                let trace = rec.flag()?;
                let a = rec.constituent()?;
                let b = rec.constituent()?;
                let mut pair = rec.check(RigidPair::new(a, b))?.with_color(color);
                if trace {
                    pair = pair.with_trail(trace_length);
                }
                scene.bodies.push(pair.into());
            }
            other => return Err(rec.error(format!("unknown tag `{other}`"))),
        }
        rec.finish()?;
    }
    Ok(scene)
}

struct Record<'a> {
    fields: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Record<'a> {
    fn error(&self, msg: impl Into<String>) -> Error {
        Error::Scene {
            line: self.line,
            msg: msg.into(),
        }
    }

    fn text(&mut self) -> Result<&'a str> {
        self.fields
            .next()
            .ok_or_else(|| self.error("record ended early"))
    }

    fn num<T: FromStr>(&mut self) -> Result<T> {
        let field = self.text()?;
        field
            .parse()
            .map_err(|_| self.error(format!("cannot parse `{field}`")))
    }

    fn flag(&mut self) -> Result<bool> {
        match self.text()? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(self.error(format!("expected 0 or 1, got `{other}`"))),
        }
    }

    fn constituent(&mut self) -> Result<Particle> {
        let color = Rgba([self.num()?, self.num()?, self.num()?, self.num()?]);
        let teflon = self.flag()?;
        let (m, r) = (self.num()?, self.num()?);
        let pos = Vec2::new(self.num()?, self.num()?);
        let vel = Vec2::new(self.num()?, self.num()?);
        Ok(self
            .check(Particle::new(m, r, pos, vel))?
            .with_color(color)
            .with_teflon(teflon))
    }

    /// Re-tag a construction error with this record's line.
    fn check<T>(&self, built: Result<T>) -> Result<T> {
        built.map_err(|e| self.error(e.to_string()))
    }

    fn finish(mut self) -> Result<()> {
        match self.fields.next() {
            Some(extra) => Err(self.error(format!("unexpected trailing field `{extra}`"))),
            None => Ok(()),
        }
    }
}
