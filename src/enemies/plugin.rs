//! Enemy plugin - registers all enemy systems.

use bevy::prelude::*;
use bevy_rapier3d::prelude::PhysicsSet;

use super::ai::{sync_enemy_bodies, think_enemies};
use super::data::{load_enemy_definitions, EnemyRegistry};
use super::population::{commit_roster, disband_roster, queue_dismissals, DismissEnemy, EnemyRoster, SpawnEnemy};
use super::spawning::{attach_enemy_visuals, deploy_garrison, muster_enemies, reinforce_on_level_completed};
use crate::core::{GameState, PlayState};
use crate::world::setup_village;

/// Order of the enemy update within a fixed tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnemySet {
    /// Spawn requests become enemies.
    Muster,
    /// Every enemy senses, transitions and steers, in roster order.
    Think,
    /// Deferred removals are applied and slots respaced.
    Roster,
}

/// Enemy plugin - handles archetype loading, the population and AI.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyRegistry>()
            .init_resource::<EnemyRoster>()
            .add_event::<SpawnEnemy>()
            .add_event::<DismissEnemy>()
            .add_systems(Startup, load_enemy_definitions)
            // The garrison needs the nav grid and player from setup_village
            .add_systems(OnEnter(GameState::InGame), deploy_garrison.after(setup_village))
            .add_systems(OnExit(GameState::InGame), disband_roster)
            .configure_sets(
                FixedUpdate,
                (EnemySet::Muster, EnemySet::Think, EnemySet::Roster)
                    .chain()
                    .run_if(in_state(PlayState::Running)),
            )
            .add_systems(
                FixedUpdate,
                (
                    (reinforce_on_level_completed, muster_enemies)
                        .chain()
                        .in_set(EnemySet::Muster),
                    think_enemies.in_set(EnemySet::Think),
                    (queue_dismissals, commit_roster).chain().in_set(EnemySet::Roster),
                ),
            )
            .add_systems(FixedPostUpdate, sync_enemy_bodies.after(PhysicsSet::Writeback))
            .add_systems(Update, attach_enemy_visuals);
    }
}
