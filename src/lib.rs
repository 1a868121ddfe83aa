//! Frame-stepped 2D billiard engine.
//!
//! Discs, rigid two-disc pairs and pressure-sensing wall segments in a
//! closed polygon. See [`core::Environment`] for the step driver.

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod scene;

pub use crate::config::EngineConfig;
pub use crate::core::{Body, BodyId, Boundary, Environment, Particle, RigidPair, Vec2};
pub use crate::error::{Error, Result};

#[cfg(feature = "python")]
mod python;
