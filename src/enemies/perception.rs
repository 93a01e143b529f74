//! Perception - detection radius, field-of-view cone and neighbour alerts.

use bevy::prelude::*;

use super::brain::EnemyBrain;
use super::tuning::Alert;

/// Projection onto the ground plane (x, z).
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Whether `target` is perceived from `observer` looking along `forward`.
///
/// Range uses the full 3D distance; the cone, when configured, is tested on
/// the ground plane.
pub fn detect(observer: Vec3, forward: Vec3, target: Vec3, radius: f32, fov_half_angle: Option<f32>) -> bool {
    if observer.distance(target) > radius {
        return false;
    }
    match fov_half_angle {
        Some(half_angle) => within_cone(forward, target - observer, half_angle),
        None => true,
    }
}

/// Planar angle test. A zero forward or zero offset always passes.
pub fn within_cone(forward: Vec3, offset: Vec3, half_angle: f32) -> bool {
    let (Some(forward), Some(offset)) = (planar(forward).try_normalize(), planar(offset).try_normalize()) else {
        return true;
    };
    forward.dot(offset).clamp(-1.0, 1.0).acos() <= half_angle
}

/// Rouse every neighbour within the alert radius that is not already
/// chasing. Returns how many were roused.
///
/// The caller passes every agent except the alerter. Roused agents are not
/// asked to alert in turn.
pub fn alert_neighbors<'a>(
    origin: Vec3,
    alert: &Alert,
    neighbours: impl IntoIterator<Item = &'a mut EnemyBrain>,
) -> usize {
    neighbours
        .into_iter()
        .map(|brain| brain.hear_alarm(origin, alert))
        .filter(|roused| *roused)
        .count()
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_4, PI};

    use super::*;
    use crate::enemies::brain::EnemyState;
    use rstest::rstest;

    #[rstest]
    #[case(5.0, true)]
    #[case(15.0, true)]
    #[case(20.0, false)]
    fn radius_only_detection(#[case] distance: f32, #[case] seen: bool) {
        let target = Vec3::new(distance, 0.0, 0.0);
        assert_eq!(detect(Vec3::ZERO, Vec3::Z, target, 15.0, None), seen);
    }

    #[test]
    fn range_counts_height() {
        assert!(!detect(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 12.0, 12.0), 15.0, None));
    }

    #[rstest]
    #[case(Vec3::new(0.0, 0.0, 5.0), true)]
    #[case(Vec3::new(2.0, 0.0, 5.0), true)]
    #[case(Vec3::new(5.0, 0.0, 2.0), false)]
    #[case(Vec3::new(0.0, 0.0, -5.0), false)]
    fn cone_limits_detection(#[case] target: Vec3, #[case] seen: bool) {
        assert_eq!(detect(Vec3::ZERO, Vec3::Z, target, 15.0, Some(FRAC_PI_4)), seen);
    }

    #[test]
    fn cone_ignores_height_of_target() {
        assert!(within_cone(Vec3::Z, Vec3::new(0.0, 10.0, 1.0), FRAC_PI_4));
    }

    #[test]
    fn degenerate_cone_inputs_pass() {
        assert!(within_cone(Vec3::ZERO, Vec3::X, 0.1));
        assert!(within_cone(Vec3::Z, Vec3::ZERO, 0.1));
        assert!(within_cone(Vec3::Y, Vec3::X, 0.1));
    }

    #[test]
    fn full_circle_cone_sees_behind() {
        assert!(within_cone(Vec3::Z, Vec3::NEG_Z, PI));
    }

    #[test]
    fn alert_rouses_only_neighbours_in_radius() {
        let alert = Alert { radius: 10.0, hold: 2.0 };
        let mut near = EnemyBrain::new(Vec3::new(3.0, 0.5, 0.0));
        let mut far = EnemyBrain::new(Vec3::new(30.0, 0.5, 0.0));

        let roused = alert_neighbors(Vec3::ZERO, &alert, [&mut near, &mut far]);

        assert_eq!(roused, 1);
        assert_eq!(near.state(), EnemyState::Chasing);
        assert_eq!(far.state(), EnemyState::Patrolling);
    }

    #[test]
    fn alert_skips_agents_already_chasing() {
        let alert = Alert { radius: 10.0, hold: 2.0 };
        let mut chaser = EnemyBrain::new(Vec3::ZERO);
        assert!(chaser.hear_alarm(Vec3::X, &alert));

        assert_eq!(alert_neighbors(Vec3::ZERO, &alert, [&mut chaser]), 0);
    }
}
