//! Village Patrol - Entry Point
//!
//! Controls:
//! - WASD: Move
//! - Shift: Sprint
//! - Escape: Pause/Unpause
//! - F1/F2/F3: Toggle enemy orbit rings, routes and view cones

use bevy::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Village Patrol".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(village_patrol::VillagePlugin)
        .run();
}
