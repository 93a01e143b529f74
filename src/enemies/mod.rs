//! Enemies module - archetypes, perception, the behaviour state machine and
//! the population manager.

mod ai;
mod brain;
mod components;
pub mod data;
pub mod debug;
mod error;
mod perception;
mod plugin;
mod population;
mod spawning;
mod tuning;

pub use brain::{
    orbit_target, EnemyBrain, EnemyState, NavTarget, Senses, Steer, Thought, ARRIVAL_RADIUS, WAYPOINT_RADIUS,
};
pub use components::*;
pub use data::{EnemyDefinition, EnemyRegistry};
pub use debug::{DebugKind, DebugOverlay, EnemyDebugPlugin, EnemyInspector};
pub use error::EnemyConfigError;
pub use perception::{alert_neighbors, detect, planar_distance, within_cone};
pub use plugin::{EnemyPlugin, EnemySet};
pub use population::{phase_offset, DismissEnemy, EnemyRoster, RosterSlot, SpawnEnemy};
pub use spawning::spawn_enemy;
pub use tuning::{Alert, BodyTuning, EnemyTuning, Pursuit, Steering};
