//! Player-related components.

use bevy::prelude::*;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Player vitals. Enemies only ever read these.
#[derive(Component, Debug, Clone)]
pub struct PlayerVitals {
    pub max_life: f32,
    pub life: f32,
}

impl PlayerVitals {
    pub fn new(max_life: f32) -> Self {
        Self {
            max_life,
            life: max_life,
        }
    }

    pub fn alive(&self) -> bool {
        self.life > 0.0
    }
}

impl Default for PlayerVitals {
    fn default() -> Self {
        Self::new(200.0)
    }
}

/// Tracks player movement state for physics.
#[derive(Component, Default)]
pub struct MovementState {
    pub is_grounded: bool,
    pub vertical_velocity: f32,
}

/// Configuration for player movement and the follow camera.
#[derive(Resource)]
pub struct PlayerConfig {
    /// Base movement speed in units per second
    pub move_speed: f32,
    /// Sprint speed multiplier
    pub sprint_multiplier: f32,
    /// Gravity acceleration
    pub gravity: f32,
    /// Camera offset from the player
    pub camera_offset: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            sprint_multiplier: 1.5,
            gravity: 15.0,
            camera_offset: Vec3::new(0.0, 10.0, 3.0),
        }
    }
}
