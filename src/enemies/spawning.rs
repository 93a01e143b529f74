//! Enemy spawning from spawn requests, the garrison and level reinforcements.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::brain::EnemyBrain;
use super::components::{Enemy, EnemyType, EnemyVisual, NavFootprint};
use super::data::EnemyRegistry;
use super::error::EnemyConfigError;
use super::population::{EnemyRoster, SpawnEnemy};
use super::tuning::EnemyTuning;
use crate::core::{GameRng, LevelCompleted, SmoothTransform};
use crate::navigation::NavGrids;
use crate::physics::{agent_material, dynamic_body, BodyShape};
use crate::player::Player;
use crate::world::{scatter, VillageLayout, SPAWN_HEIGHT};

/// Half-width of the square around the village centre reinforcements appear in.
const REINFORCEMENT_SPREAD: f32 = 5.0;

/// Spawn one enemy and enlist it in the roster.
///
/// Refused when the archetype is unknown, when there is no player to hunt, or
/// when a path-following archetype has no navigation grid to path on.
pub fn spawn_enemy(
    commands: &mut Commands,
    registry: &EnemyRegistry,
    roster: &mut EnemyRoster,
    nav: Option<&mut NavGrids>,
    player: Option<Entity>,
    request: &SpawnEnemy,
) -> Result<Entity, EnemyConfigError> {
    let tuning = registry
        .get(&request.archetype)
        .ok_or_else(|| EnemyConfigError::UnknownArchetype(request.archetype.clone()))?;

    if player.is_none() {
        return Err(EnemyConfigError::MissingCollaborator {
            archetype: request.archetype.clone(),
            missing: "player",
        });
    }

    let footprint = match nav {
        Some(grids) => {
            let cells = tuning.footprint_cells(grids.base());
            grids.prepare(cells);
            cells
        }
        None if tuning.pursuit.needs_navigation() => {
            return Err(EnemyConfigError::MissingCollaborator {
                archetype: request.archetype.clone(),
                missing: "navigation grid",
            });
        }
        None => 0,
    };

    let body = tuning.body;
    let entity = commands
        .spawn((
            Enemy,
            EnemyType(request.archetype.clone()),
            EnemyBrain::new(request.position),
            tuning.clone(),
            NavFootprint(footprint),
            dynamic_body(body.shape, body.mass, request.position),
            Damping {
                linear_damping: body.linear_damping,
                angular_damping: body.angular_damping,
            },
            agent_material(body.friction, body.restitution),
            Visibility::default(),
        ))
        .id();

    let index = roster.enlist(entity);
    commands.entity(entity).insert(roster.slot(index));

    Ok(entity)
}

/// Handle spawn requests sent this tick.
pub fn muster_enemies(
    mut commands: Commands,
    mut requests: EventReader<SpawnEnemy>,
    registry: Res<EnemyRegistry>,
    mut roster: ResMut<EnemyRoster>,
    mut nav: Option<ResMut<NavGrids>>,
    player_query: Query<Entity, With<Player>>,
) {
    let player = player_query.get_single().ok();

    for request in requests.read() {
        match spawn_enemy(
            &mut commands,
            &registry,
            &mut roster,
            nav.as_deref_mut(),
            player,
            request,
        ) {
            Ok(entity) => info!(
                "Spawned {} {:?} at ({:.1}, {:.1})",
                request.archetype, entity, request.position.x, request.position.z
            ),
            Err(e) => error!("Refused to spawn enemy: {}", e),
        }
    }
}

/// Request the village garrison when the game starts.
pub fn deploy_garrison(
    layout: Option<Res<VillageLayout>>,
    mut rng: ResMut<GameRng>,
    mut spawns: EventWriter<SpawnEnemy>,
) {
    let Some(layout) = layout else {
        return;
    };

    for group in &layout.garrison {
        for _ in 0..group.count {
            spawns.send(SpawnEnemy {
                archetype: group.archetype.clone(),
                position: group.spawn_point(&mut rng.0),
            });
        }
    }
}

/// Add one reinforcement for every completed level.
pub fn reinforce_on_level_completed(
    mut completions: EventReader<LevelCompleted>,
    layout: Option<Res<VillageLayout>>,
    mut rng: ResMut<GameRng>,
    mut spawns: EventWriter<SpawnEnemy>,
) {
    let Some(layout) = layout else {
        completions.clear();
        return;
    };

    for completed in completions.read() {
        let position = scatter(Vec3::new(0.0, SPAWN_HEIGHT, 0.0), REINFORCEMENT_SPREAD, &mut rng.0);
        debug!("Level {} completed, sending a {}", completed.level, layout.reinforcement);
        spawns.send(SpawnEnemy {
            archetype: layout.reinforcement.clone(),
            position,
        });
    }
}

/// Give newly spawned enemies a mesh child. Skipped when rendering assets
/// are unavailable.
pub fn attach_enemy_visuals(
    mut commands: Commands,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
    new_enemies: Query<(Entity, &EnemyTuning), Added<Enemy>>,
) {
    let (Some(mut meshes), Some(mut materials)) = (meshes, materials) else {
        return;
    };

    for (entity, tuning) in new_enemies.iter() {
        let mesh = match tuning.body.shape {
            BodyShape::Cylinder { half_height, radius } => meshes.add(Cylinder::new(radius, half_height * 2.0)),
            BodyShape::Cuboid { half_extents } => {
                let size = half_extents * 2.0;
                meshes.add(Cuboid::new(size.x, size.y, size.z))
            }
        };
        let material = materials.add(tuning.color);

        commands.entity(entity).with_children(|parent| {
            parent.spawn((
                EnemyVisual,
                Mesh3d(mesh),
                MeshMaterial3d(material),
                SmoothTransform::new(0.0, 10.0),
            ));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{NavGrid, WorldBounds};

    fn request(archetype: &str) -> SpawnEnemy {
        SpawnEnemy {
            archetype: archetype.to_string(),
            position: Vec3::new(1.0, SPAWN_HEIGHT, 2.0),
        }
    }

    fn attempt(
        archetype: &str,
        nav: Option<&mut NavGrids>,
        player: Option<Entity>,
    ) -> (Result<Entity, EnemyConfigError>, EnemyRoster) {
        let mut world = World::new();
        let mut roster = EnemyRoster::default();
        let registry = EnemyRegistry::builtin();
        let mut queue = bevy::ecs::world::CommandQueue::default();
        let result = {
            let mut commands = Commands::new(&mut queue, &world);
            spawn_enemy(&mut commands, &registry, &mut roster, nav, player, &request(archetype))
        };
        queue.apply(&mut world);
        (result, roster)
    }

    #[test]
    fn unknown_archetypes_are_refused() {
        let (result, roster) = attempt("dragon", None, Some(Entity::from_raw(0)));
        assert_eq!(result, Err(EnemyConfigError::UnknownArchetype("dragon".to_string())));
        assert!(roster.is_empty());
    }

    #[test]
    fn spawning_needs_a_player() {
        let (result, _) = attempt("sentinel", None, None);
        assert!(matches!(
            result,
            Err(EnemyConfigError::MissingCollaborator { missing: "player", .. })
        ));
    }

    #[test]
    fn path_followers_need_a_grid() {
        let (result, roster) = attempt("hunter", None, Some(Entity::from_raw(0)));
        assert!(matches!(
            result,
            Err(EnemyConfigError::MissingCollaborator {
                missing: "navigation grid",
                ..
            })
        ));
        assert!(roster.is_empty());
    }

    #[test]
    fn orbiters_spawn_without_a_grid() {
        let (result, roster) = attempt("sentinel", None, Some(Entity::from_raw(0)));
        let entity = result.unwrap();
        assert_eq!(roster.members(), &[entity]);
    }

    #[test]
    fn spawning_prepares_the_footprint_grid() {
        let mut grid = NavGrid::new(100, 100, WorldBounds::centered(50.0)).unwrap();
        grid.set_obstacle(crate::navigation::GridCell::new(50, 50));
        let mut grids = NavGrids::new(grid);

        let (result, _) = attempt("hunter", Some(&mut grids), Some(Entity::from_raw(0)));

        assert!(result.is_ok());
        assert!(grids.for_footprint(1).obstacle_count() > 1);
    }
}
