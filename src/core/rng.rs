//! Shared random source for patrol points, spawn positions and goal placement.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seedable RNG resource. Tests insert a fixed seed for repeatable runs.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
