//! Transform smoothing toward a moving target.

use bevy::prelude::*;

/// Eases an entity's transform toward targets set by other systems.
///
/// Used for presentation only: enemy heading and the follow camera.
#[derive(Component, Debug, Clone)]
pub struct SmoothTransform {
    /// Target translation (None = don't animate)
    pub target_translation: Option<Vec3>,
    /// Target rotation (None = don't animate)
    pub target_rotation: Option<Quat>,
    /// Convergence rate per second (higher = snappier)
    pub translation_speed: f32,
    pub rotation_speed: f32,
}

impl Default for SmoothTransform {
    fn default() -> Self {
        Self {
            target_translation: None,
            target_rotation: None,
            translation_speed: 12.0,
            rotation_speed: 12.0,
        }
    }
}

impl SmoothTransform {
    pub fn new(translation_speed: f32, rotation_speed: f32) -> Self {
        Self {
            translation_speed,
            rotation_speed,
            ..default()
        }
    }

    /// Face along a planar direction, keeping the current target if it is zero.
    pub fn face(&mut self, forward: Vec3) {
        if forward.x != 0.0 || forward.z != 0.0 {
            self.target_rotation = Some(Quat::from_rotation_y(forward.x.atan2(forward.z)));
        }
    }
}

/// Fraction of the remaining distance covered in `dt` at `rate`.
pub fn ease_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// System that interpolates transforms toward their targets.
pub fn update_smooth_transforms(time: Res<Time>, mut query: Query<(&mut Transform, &SmoothTransform)>) {
    let dt = time.delta_secs();

    for (mut transform, smooth) in query.iter_mut() {
        if let Some(target) = smooth.target_translation {
            transform.translation = transform.translation.lerp(target, ease_factor(smooth.translation_speed, dt));
        }
        if let Some(target) = smooth.target_rotation {
            transform.rotation = transform.rotation.slerp(target, ease_factor(smooth.rotation_speed, dt));
        }
    }
}
