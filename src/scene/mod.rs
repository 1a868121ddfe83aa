//! Scene construction helpers: the line-oriented text format and random
//! particle placement.

pub mod scatter;
pub mod text;

pub use scatter::scatter_particles;
pub use text::{parse_scene, write_scene};

use crate::core::{Body, Boundary, Environment};
use crate::error::Result;

/// Walls and moving bodies reconstructed from a scene description.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub boundaries: Vec<Boundary>,
    pub bodies: Vec<Body>,
}

impl Scene {
    pub fn into_environment(self) -> Result<Environment> {
        Environment::new(self.boundaries, self.bodies)
    }

    /// Swap the whole body/wall set of `env` for this scene.
    pub fn load_into(self, env: &mut Environment) -> Result<()> {
        env.replace(self.boundaries, self.bodies)
    }
}
