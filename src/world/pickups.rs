//! Collectibles, the goal and level progression.

use bevy::prelude::*;

use super::data::{scatter, VillageLayout};
use crate::core::{GameRng, ItemPickupEvent, LevelCompleted};
use crate::player::Player;

/// Item worth `value` points when the player walks into it.
#[derive(Component, Debug, Clone, Copy)]
pub struct Collectible {
    pub value: u32,
}

/// Marker for the level goal.
#[derive(Component)]
pub struct Goal;

/// Score and current level (first level is 1).
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self { score: 0, level: 1 }
    }
}

/// Pick up every collectible within reach of the player.
pub fn collect_items(
    mut commands: Commands,
    layout: Res<VillageLayout>,
    mut progress: ResMut<Progress>,
    player_query: Query<(Entity, &Transform), With<Player>>,
    items: Query<(Entity, &Transform, &Collectible), Without<Player>>,
    mut pickups: EventWriter<ItemPickupEvent>,
) {
    let Ok((player, player_transform)) = player_query.get_single() else {
        return;
    };

    for (item, transform, collectible) in items.iter() {
        if transform.translation.distance(player_transform.translation) >= layout.collectibles.reach {
            continue;
        }
        progress.score += collectible.value;
        commands.entity(item).despawn_recursive();
        pickups.send(ItemPickupEvent {
            item,
            player,
            value: collectible.value,
        });
        info!("Collected item worth {} (score {})", collectible.value, progress.score);
    }
}

/// Advance the level when the player reaches the goal, then move the goal.
pub fn reach_goal(
    layout: Res<VillageLayout>,
    mut rng: ResMut<GameRng>,
    mut progress: ResMut<Progress>,
    player_query: Query<&Transform, (With<Player>, Without<Goal>)>,
    mut goal_query: Query<&mut Transform, (With<Goal>, Without<Player>)>,
    mut completions: EventWriter<LevelCompleted>,
) {
    let Ok(player) = player_query.get_single() else {
        return;
    };
    let Ok(mut goal) = goal_query.get_single_mut() else {
        return;
    };

    let offset = goal.translation - player.translation;
    if Vec2::new(offset.x, offset.z).length() >= layout.goal.reach {
        return;
    }

    let finished = progress.level;
    progress.level += 1;
    completions.send(LevelCompleted { level: finished });

    let moved = scatter(layout.goal_origin(), layout.goal.scatter, &mut rng.0);
    goal.translation = Vec3::new(moved.x, goal.translation.y, moved.z);
    info!("Level {} complete, goal moved to ({:.1}, {:.1})", finished, moved.x, moved.z);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.insert_resource(VillageLayout::builtin().unwrap())
            .insert_resource(GameRng::seeded(3))
            .init_resource::<Progress>()
            .add_event::<ItemPickupEvent>()
            .add_event::<LevelCompleted>()
            .add_systems(Update, (collect_items, reach_goal));
        app
    }

    #[test]
    fn nearby_items_are_collected_once() {
        let mut app = app();
        app.world_mut().spawn((Player, Transform::from_xyz(0.0, 1.0, 0.0)));
        app.world_mut()
            .spawn((Collectible { value: 5 }, Transform::from_xyz(0.3, 0.5, 0.2)));
        app.world_mut()
            .spawn((Collectible { value: 5 }, Transform::from_xyz(4.0, 0.5, 0.0)));

        app.update();
        app.update();

        assert_eq!(app.world().resource::<Progress>().score, 5);
        let remaining = app
            .world_mut()
            .query::<&Collectible>()
            .iter(app.world())
            .count();
        assert_eq!(remaining, 1);
    }

    #[test]
    fn reaching_goal_advances_level_and_moves_goal() {
        let mut app = app();
        app.world_mut().spawn((Player, Transform::from_xyz(5.0, 1.0, -5.0)));
        let goal = app.world_mut().spawn((Goal, Transform::from_xyz(5.0, 0.05, -5.0))).id();

        app.update();

        assert_eq!(app.world().resource::<Progress>().level, 2);
        let completions = app.world().resource::<Events<LevelCompleted>>();
        let levels: Vec<u32> = completions.get_cursor().read(completions).map(|e| e.level).collect();
        assert_eq!(levels, vec![1]);

        let moved = app.world().get::<Transform>(goal).unwrap().translation;
        assert!((moved.x - 5.0).abs() <= 5.0 && (moved.z + 5.0).abs() <= 5.0);
        assert_eq!(moved.y, 0.05);
    }

    #[test]
    fn distant_goal_is_left_alone() {
        let mut app = app();
        app.world_mut().spawn((Player, Transform::from_xyz(-20.0, 1.0, 20.0)));
        app.world_mut().spawn((Goal, Transform::from_xyz(5.0, 0.05, -5.0)));

        app.update();

        assert_eq!(app.world().resource::<Progress>().level, 1);
    }
}
