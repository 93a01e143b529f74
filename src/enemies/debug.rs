//! Read-only view of enemy state and an optional gizmo overlay.
//!
//! [`EnemyInspector`] answers position, state and debug-geometry queries for any
//! enemy. The overlay is one consumer; nothing in the AI depends on it.

use std::f32::consts::TAU;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::brain::{orbit_target, EnemyBrain, EnemyState, NavTarget};
use super::components::Enemy;
use super::tuning::{EnemyTuning, Pursuit};
use crate::player::Player;

const RING_SEGMENTS: usize = 32;

/// Which debug polyline to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugKind {
    /// Ring the agent orbits the player on.
    Orbit,
    /// Current patrol, return or chase route.
    PatrolPath,
    /// Detection range, as a wedge when the agent has a view cone.
    FieldOfView,
}

impl DebugKind {
    pub const ALL: [DebugKind; 3] = [DebugKind::Orbit, DebugKind::PatrolPath, DebugKind::FieldOfView];

    fn color(self) -> Color {
        match self {
            DebugKind::Orbit => Color::srgb(0.9, 0.3, 0.9),
            DebugKind::PatrolPath => Color::srgb(0.2, 0.9, 0.3),
            DebugKind::FieldOfView => Color::srgb(0.9, 0.8, 0.2),
        }
    }
}

/// Closed circle of `radius` around `center` in the horizontal plane.
pub fn ring(center: Vec3, radius: f32) -> Vec<Vec3> {
    (0..=RING_SEGMENTS)
        .map(|i| orbit_target(center, radius, TAU * i as f32 / RING_SEGMENTS as f32))
        .collect()
}

/// Route from the agent's position through what is left of its target.
pub fn route(position: Vec3, target: &NavTarget) -> Vec<Vec3> {
    match target {
        NavTarget::None => Vec::new(),
        NavTarget::Point(point) => vec![position, *point],
        NavTarget::Path { .. } => std::iter::once(position)
            .chain(target.remaining().iter().copied())
            .collect(),
    }
}

/// Outline of what the agent can see. A full ring without a view cone.
pub fn view_outline(position: Vec3, forward: Vec3, radius: f32, half_angle: Option<f32>) -> Vec<Vec3> {
    let Some(half_angle) = half_angle else {
        return ring(position, radius);
    };

    // orbit_target measures angles from +X toward +Z.
    let heading = forward.z.atan2(forward.x);
    let arc = (0..=RING_SEGMENTS).map(|i| {
        let t = i as f32 / RING_SEGMENTS as f32;
        orbit_target(position, radius, heading - half_angle + 2.0 * half_angle * t)
    });

    std::iter::once(position)
        .chain(arc)
        .chain(std::iter::once(position))
        .collect()
}

/// Pull API over enemy state for renderers and tools.
#[derive(SystemParam)]
pub struct EnemyInspector<'w, 's> {
    enemies: Query<'w, 's, (Entity, &'static EnemyBrain, &'static EnemyTuning), With<Enemy>>,
    player: Query<'w, 's, &'static Transform, (With<Player>, Without<Enemy>)>,
}

impl EnemyInspector<'_, '_> {
    pub fn enemies(&self) -> impl Iterator<Item = Entity> + '_ {
        self.enemies.iter().map(|(entity, ..)| entity)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.enemies.get(entity).ok().map(|(_, brain, _)| brain.position())
    }

    pub fn state(&self, entity: Entity) -> Option<EnemyState> {
        self.enemies.get(entity).ok().map(|(_, brain, _)| brain.state())
    }

    /// World-space polyline for `kind`. Empty when the enemy does not exist
    /// or the geometry does not apply to it.
    pub fn debug_geometry(&self, entity: Entity, kind: DebugKind) -> Vec<Vec3> {
        let Ok((_, brain, tuning)) = self.enemies.get(entity) else {
            return Vec::new();
        };

        match kind {
            DebugKind::Orbit => match (tuning.pursuit, self.player.get_single()) {
                (Pursuit::Orbit { radius, .. }, Ok(player)) => ring(player.translation, radius),
                _ => Vec::new(),
            },
            DebugKind::PatrolPath => route(brain.position(), brain.target()),
            DebugKind::FieldOfView => view_outline(
                brain.position(),
                brain.forward(),
                tuning.detection_radius,
                tuning.fov_half_angle,
            ),
        }
    }
}

/// Which overlays are drawn.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct DebugOverlay {
    pub orbit: bool,
    pub patrol_path: bool,
    pub field_of_view: bool,
}

impl DebugOverlay {
    pub fn enabled(&self, kind: DebugKind) -> bool {
        match kind {
            DebugKind::Orbit => self.orbit,
            DebugKind::PatrolPath => self.patrol_path,
            DebugKind::FieldOfView => self.field_of_view,
        }
    }

    pub fn toggle(&mut self, kind: DebugKind) {
        let flag = match kind {
            DebugKind::Orbit => &mut self.orbit,
            DebugKind::PatrolPath => &mut self.patrol_path,
            DebugKind::FieldOfView => &mut self.field_of_view,
        };
        *flag = !*flag;
    }
}

/// F1 orbit rings, F2 routes, F3 view cones.
pub fn toggle_debug_overlay(keyboard: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<DebugOverlay>) {
    for (key, kind) in [
        (KeyCode::F1, DebugKind::Orbit),
        (KeyCode::F2, DebugKind::PatrolPath),
        (KeyCode::F3, DebugKind::FieldOfView),
    ] {
        if keyboard.just_pressed(key) {
            overlay.toggle(kind);
            info!("Debug {:?}: {}", kind, overlay.enabled(kind));
        }
    }
}

pub fn draw_debug_overlay(overlay: Res<DebugOverlay>, inspector: EnemyInspector, mut gizmos: Gizmos) {
    for kind in DebugKind::ALL.into_iter().filter(|kind| overlay.enabled(*kind)) {
        for entity in inspector.enemies() {
            let points = inspector.debug_geometry(entity, kind);
            if points.len() > 1 {
                gizmos.linestrip(points, kind.color());
            }
        }
    }
}

/// Gizmo overlay for enemy debug geometry. Needs a renderer.
pub struct EnemyDebugPlugin;

impl Plugin for EnemyDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugOverlay>()
            .add_systems(Update, (toggle_debug_overlay, draw_debug_overlay).chain());
    }
}
