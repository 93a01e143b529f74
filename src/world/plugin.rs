//! World plugin - village loading, construction and pickups.

use bevy::prelude::*;

use crate::core::{GameRng, GameState, PlayState};
use crate::navigation::NavGrids;
use crate::player::{spawn_player, Player, PlayerCamera, PlayerConfig, PlayerVitals};

use super::builder::{build_village, VillageGeometry};
use super::data::{load_village_layout, VillageLayout};
use super::pickups::{collect_items, reach_goal, Progress};

/// World plugin - handles village loading and world setup.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Progress>()
            .add_systems(Startup, load_village_layout)
            .add_systems(OnEnter(GameState::InGame), setup_village)
            .add_systems(OnExit(GameState::InGame), cleanup_village)
            .add_systems(
                Update,
                (collect_items, reach_goal).run_if(in_state(PlayState::Running)),
            );
    }
}

/// Build the village, its navigation grid and the player.
pub fn setup_village(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<GameRng>,
    layout: Option<Res<VillageLayout>>,
    player_config: Res<PlayerConfig>,
) {
    let Some(layout) = layout else {
        error!("No village layout loaded!");
        return;
    };

    info!("Building village: {}", layout.name);

    match layout.nav_grid() {
        Ok(grid) => {
            info!(
                "Navigation grid {}x{} with {} blocked cells",
                grid.width(),
                grid.height(),
                grid.obstacle_count()
            );
            commands.insert_resource(NavGrids::new(grid));
        }
        Err(e) => error!("Village has no navigation grid: {}", e),
    }

    build_village(&mut commands, &mut meshes, &mut materials, &layout, &mut rng.0);
    commands.insert_resource(Progress::default());

    spawn_player(
        &mut commands,
        layout.player_start(),
        PlayerVitals::new(layout.player.life),
        &player_config,
    );
}

/// Clean up village entities when leaving InGame state.
fn cleanup_village(
    mut commands: Commands,
    village_query: Query<Entity, Or<(With<VillageGeometry>, With<Player>, With<PlayerCamera>)>>,
) {
    for entity in village_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<NavGrids>();
}
