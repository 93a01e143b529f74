//! Village Patrol - a small third-person village game with patrolling enemies in Bevy.
//!
//! The player walks a fenced village collecting items and reaching a goal
//! while enemies patrol around their spawn points, chase when they see the
//! player and return home when they lose track.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, global events, the fixed tick and shared RNG
//! - **Physics**: Rapier stepping and the per-agent body proxy
//! - **Player**: Movement, follow camera, player vitals
//! - **World**: Village layout, obstacles, collectibles and the goal
//! - **Navigation**: Walkability grid and A* paths around obstacles
//! - **Enemies**: Archetypes, perception, the behaviour state machine and
//!   the population manager
//!
//! The enemy core (`navigation`, perception and `EnemyBrain`) is plain Rust
//! driven by thin ECS systems, so it can be tested without a running world.

pub mod core;
pub mod enemies;
pub mod navigation;
pub mod physics;
pub mod player;
pub mod world;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
pub struct VillagePlugin;

impl Plugin for VillagePlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)
            .add_plugins(physics::PhysicsPlugin)
            .add_plugins(player::PlayerPlugin)
            .add_plugins(world::WorldPlugin)
            .add_plugins(enemies::EnemyPlugin)
            .add_plugins(enemies::EnemyDebugPlugin);
    }
}
