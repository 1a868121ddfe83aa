//! Engine run settings loaded from YAML.
//!
//! ```yaml
//! dt: 0.02            # frame length
//! gravity: 10.0       # acceleration along +y
//! stack_size: 100     # pressure samples kept per wall
//! trace_length: 2500  # trail samples kept per body
//! trace_frequency: 6  # frames between trail samples
//! grid_margin: 50.0   # padding around the walls for the broad-phase grid
//! ```
//!
//! Every key is optional; missing keys take the defaults above (except
//! `dt`, 0.05, and `gravity`, 0.0).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::sim::{DEFAULT_GRID_MARGIN, DEFAULT_TRACE_FREQUENCY};
use crate::core::{polygon_boundaries, Body, Environment, Vec2, DEFAULT_STACK_SIZE};
use crate::error::{Error, Result};

pub const DEFAULT_TRACE_LENGTH: usize = 2500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub dt: f64,
    pub gravity: f64,
    pub stack_size: usize,
    pub trace_length: usize,
    pub trace_frequency: u64,
    pub grid_margin: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            gravity: 0.0,
            stack_size: DEFAULT_STACK_SIZE,
            trace_length: DEFAULT_TRACE_LENGTH,
            trace_frequency: DEFAULT_TRACE_FREQUENCY,
            grid_margin: DEFAULT_GRID_MARGIN,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidParam("dt must be finite and > 0".into()));
        }
        if !self.gravity.is_finite() {
            return Err(Error::InvalidParam("gravity must be finite".into()));
        }
        if self.stack_size == 0 {
            return Err(Error::InvalidParam("stack_size must be > 0".into()));
        }
        if self.trace_frequency == 0 {
            return Err(Error::InvalidParam("trace_frequency must be > 0".into()));
        }
        if !self.grid_margin.is_finite() || self.grid_margin < 0.0 {
            return Err(Error::InvalidParam("grid_margin must be finite and >= 0".into()));
        }
        Ok(())
    }

    /// Build a polygon environment using this config's wall and grid settings.
    pub fn build_environment(
        &self,
        vertices: &[Vec2],
        sort_vertices: bool,
        bodies: Vec<Body>,
    ) -> Result<Environment> {
        self.validate()?;
        let walls = polygon_boundaries(vertices, sort_vertices, self.stack_size)?;
        let mut env = Environment::with_margin(walls, bodies, self.grid_margin)?;
        env.set_trace_frequency(self.trace_frequency);
        Ok(env)
    }

    /// One frame with this config's `dt` and `gravity`.
    pub fn step(&self, env: &mut Environment) -> Result<()> {
        env.step(self.dt, self.gravity)
    }
}
