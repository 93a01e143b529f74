//! Enemy AI systems - feed each brain its senses and drive its body.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::brain::{EnemyBrain, Senses};
use super::components::{Enemy, EnemyVisual, NavFootprint};
use super::perception::alert_neighbors;
use super::population::{EnemyRoster, RosterSlot};
use super::tuning::{Alert, EnemyTuning};
use crate::core::{EnemyAlarmRaised, GameRng, SmoothTransform};
use crate::navigation::{NavGrids, NavigationService, OpenField};
use crate::physics::RapierBody;
use crate::player::{Player, PlayerVitals};

type ThinkingEnemies<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut EnemyBrain,
        &'static EnemyTuning,
        &'static RosterSlot,
        &'static Transform,
        &'static mut Velocity,
        &'static mut ExternalForce,
        &'static NavFootprint,
    ),
    With<Enemy>,
>;

/// Tick every enemy in roster order, then deliver alarms.
pub fn think_enemies(
    time: Res<Time>,
    roster: Res<EnemyRoster>,
    nav: Option<Res<NavGrids>>,
    mut rng: ResMut<GameRng>,
    player_query: Query<(&Transform, &PlayerVitals), (With<Player>, Without<Enemy>)>,
    mut enemies: ThinkingEnemies,
    mut alarms: EventWriter<EnemyAlarmRaised>,
) {
    let player = player_query
        .get_single()
        .ok()
        .filter(|(_, vitals)| vitals.alive())
        .map(|(transform, _)| transform.translation);
    let dt = time.delta_secs();
    let elapsed = time.elapsed_secs();

    let mut raised: Vec<(Entity, Vec3, Alert)> = Vec::new();

    for &entity in roster.members() {
        let Ok((_, mut brain, tuning, slot, transform, mut velocity, mut force, footprint)) = enemies.get_mut(entity)
        else {
            continue;
        };

        let navigation: &dyn NavigationService = match nav.as_deref() {
            Some(grids) => grids.for_footprint(footprint.0),
            None => &OpenField,
        };

        brain.sync_position(transform.translation);
        let senses = Senses {
            player,
            elapsed,
            dt,
            phase_offset: slot.phase_offset,
        };
        let thought = brain.tick(tuning, &senses, navigation, &mut rng.0);

        let mut body = RapierBody::new(transform, &mut velocity, &mut force);
        thought.steer.apply(&mut body);

        if thought.previous != brain.state() {
            debug!("{} {:?}: {:?} -> {:?}", tuning.archetype, entity, thought.previous, brain.state());
        }
        if thought.raised_alarm {
            if let Some(alert) = tuning.alert {
                raised.push((entity, brain.position(), alert));
            }
        }
    }

    for (alerter, origin, alert) in raised {
        let neighbours = enemies
            .iter_mut()
            .filter(|(entity, ..)| *entity != alerter)
            .map(|(_, brain, ..)| brain.into_inner());
        let roused = alert_neighbors(origin, &alert, neighbours);

        info!("Enemy {:?} raised the alarm, {} neighbours joined the chase", alerter, roused);
        alarms.send(EnemyAlarmRaised {
            enemy: alerter,
            origin,
            roused,
        });
    }
}

/// Mirror body positions after the physics step and turn visuals toward
/// the heading.
pub fn sync_enemy_bodies(
    mut enemies: Query<(&Transform, &mut EnemyBrain, Option<&Children>), With<Enemy>>,
    mut visuals: Query<&mut SmoothTransform, With<EnemyVisual>>,
) {
    for (transform, mut brain, children) in enemies.iter_mut() {
        brain.sync_position(transform.translation);

        let Some(children) = children else {
            continue;
        };
        for child in children.iter() {
            if let Ok(mut smooth) = visuals.get_mut(*child) {
                smooth.face(brain.forward());
            }
        }
    }
}
