//! Validated per-archetype parameters.
//!
//! An [`EnemyTuning`] is only ever produced by
//! [`EnemyDefinition::to_tuning`](super::data::EnemyDefinition::to_tuning),
//! so every value in it has passed range checks.

use bevy::prelude::*;
use serde::Deserialize;

use crate::physics::BodyShape;

/// How an enemy closes in on the player while chasing.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Pursuit {
    /// Circle the player, spaced by roster phase offset.
    Orbit { radius: f32, angular_speed: f32 },
    /// Follow a grid path toward the player.
    PathFollow { repath_distance: f32, retry_delay: f32 },
}

impl Pursuit {
    pub fn needs_navigation(&self) -> bool {
        matches!(self, Pursuit::PathFollow { .. })
    }
}

/// How steering intent reaches the body. Fixed per archetype.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    /// Overwrite planar velocity.
    Velocity,
    /// Push with a force, relying on damping to settle the motion.
    Force { magnitude: f32 },
}

/// Neighbour alerting on first sight of the player.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub radius: f32,
    /// Seconds a roused neighbour keeps chasing without seeing the player.
    pub hold: f32,
}

/// Rigid body parameters for spawning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTuning {
    pub shape: BodyShape,
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct EnemyTuning {
    pub archetype: String,
    pub speed: f32,
    pub detection_radius: f32,
    pub fov_half_angle: Option<f32>,
    pub patrol_radius: f32,
    pub patrol_factor: f32,
    pub reaction_delay: f32,
    pub pursuit: Pursuit,
    pub steering: Steering,
    pub alert: Option<Alert>,
    pub body: BodyTuning,
    pub color: Color,
}

impl EnemyTuning {
    /// Navigation footprint in cells for this body on the given grid.
    pub fn footprint_cells(&self, grid: &crate::navigation::NavGrid) -> u32 {
        grid.footprint_cells(self.body.shape.width())
    }
}
