//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. Enemy AI, player
//! movement and pickups only run while `PlayState::Running` is active.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` while data files are read
/// - Enter `InGame` once the village can be built
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Village is built and populated
    InGame,
}

/// Sub-states for gameplay - only active when GameState::InGame.
///
/// Pausing is a sub-state so the village and its enemies survive it;
/// leaving `InGame` tears everything down.
#[derive(SubStates, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum PlayState {
    /// Simulation advancing
    #[default]
    Running,
    /// Simulation frozen, world still visible
    Paused,
}
