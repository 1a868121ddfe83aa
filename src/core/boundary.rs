use std::collections::VecDeque;

use super::bounds::Aabb;
use super::particle::Rgba;
use super::vector::Vec2;
use crate::error::{Error, Result};

/// Default number of pressure samples kept per boundary.
pub const DEFAULT_STACK_SIZE: usize = 100;

/// Sliding window of per-frame wall pressure samples.
///
/// Impulses are accumulated during a frame and committed once, after all
/// contacts of that frame are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureWindow {
    samples: VecDeque<f64>,
    capacity: usize,
    current_momentum: f64,
}

impl PressureWindow {
    /// Errors: `Error::InvalidParam` if `capacity == 0`.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidParam("stack_size must be > 0".into()));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            current_momentum: 0.0,
        })
    }

    /// Add a normal momentum transfer to the current frame.
    #[inline]
    pub fn accumulate(&mut self, normal_momentum: f64) {
        self.current_momentum += normal_momentum;
    }

    /// Close the frame: push `current_momentum / dt / length`, evict past capacity, reset.
    pub fn commit(&mut self, dt: f64, length: f64) {
        self.push_sample(self.current_momentum / dt / length);
        self.current_momentum = 0.0;
    }

    /// Append a raw sample, evicting the oldest when full.
    pub fn push_sample(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Arithmetic mean of the retained samples; 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn current_momentum(&self) -> f64 {
        self.current_momentum
    }

    pub fn samples(&self) -> impl ExactSizeIterator<Item = &f64> {
        self.samples.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Immovable wall segment from `p1` to `p2`.
///
/// `normal` is `(-dy, dx) / length`: unit length and perpendicular to the
/// segment. Endpoints never change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    p1: Vec2,
    p2: Vec2,
    center: Vec2,
    normal: Vec2,
    length: f64,
    pub teflon: bool,
    pub color: Rgba,
    pub pressure: PressureWindow,
}

impl Boundary {
    /// Errors: `Error::InvalidParam` for non-finite or coincident endpoints, or `stack_size == 0`.
    pub fn new(p1: Vec2, p2: Vec2, stack_size: usize) -> Result<Self> {
        if !p1.is_finite() || !p2.is_finite() {
            return Err(Error::InvalidParam("boundary endpoints must be finite".into()));
        }
        let d = p2 - p1;
        let length = d.length();
        if length <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "boundary endpoints coincide at ({}, {})",
                p1.x, p1.y
            )));
        }
        Ok(Self {
            p1,
            p2,
            center: (p1 + p2) * 0.5,
            normal: d.perp() * (1.0 / length),
            length,
            teflon: true,
            color: Rgba::BLACK,
            pressure: PressureWindow::new(stack_size)?,
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

    pub fn endpoints(&self) -> (Vec2, Vec2) {
        (self.p1, self.p2)
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn stack_size(&self) -> usize {
        self.pressure.capacity()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_corners(self.p1, self.p2)
    }

    /// Record momentum `impulse` transferred to the wall; stored as push against the normal.
    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.pressure.accumulate(-impulse.dot(self.normal));
    }

    pub fn commit_pressure(&mut self, dt: f64) {
        self.pressure.commit(dt, self.length);
    }

    pub fn mean_pressure(&self) -> f64 {
        self.pressure.mean()
    }
}
