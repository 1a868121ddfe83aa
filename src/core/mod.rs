#![allow(missing_docs)]

//! Core simulation data structures and the frame-stepped collision engine.
//!
//! Leaf-first: `vector` and `bounds` geometry, the three body variants
//! (`boundary`, `particle`, `rigid_pair`) unified by `body`, the pairwise
//! `contact` predicates and `response` rules, the `grid` broad phase, and the
//! `sim` step driver.

pub mod body;
pub mod boundary;
pub mod bounds;
pub mod contact;
pub mod grid;
pub mod particle;
pub mod response;
pub mod rigid_pair;
pub mod sim;
pub mod vector;

pub use body::{Body, BodyId, BodyKind};
pub use boundary::{Boundary, PressureWindow, DEFAULT_STACK_SIZE};
pub use bounds::Aabb;
pub use grid::SpatialGrid;
pub use particle::{Particle, PointMass, Rgba, Trail};
pub use rigid_pair::{PairMode, RigidPair};
pub use sim::{polygon_boundaries, Environment, PhaseTimings};
pub use vector::Vec2;
