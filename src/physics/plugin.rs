//! Physics plugin - rapier stepping on the fixed clock.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::core::{PlayState, SIMULATION_HZ};

/// Steps the rapier world in `FixedPostUpdate`, one step per fixed tick.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
            .insert_resource(TimestepMode::Fixed {
                dt: (1.0 / SIMULATION_HZ) as f32,
                substeps: 1,
            })
            .add_systems(OnEnter(PlayState::Paused), freeze_physics)
            .add_systems(OnExit(PlayState::Paused), resume_physics);
    }
}

fn freeze_physics(mut configs: Query<&mut RapierConfiguration>) {
    for mut config in configs.iter_mut() {
        config.physics_pipeline_active = false;
    }
}

fn resume_physics(mut configs: Query<&mut RapierConfiguration>) {
    for mut config in configs.iter_mut() {
        config.physics_pipeline_active = true;
    }
}
