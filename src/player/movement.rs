//! Player movement and follow camera.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use crate::core::{PlayState, SmoothTransform};

/// Camera that trails the player from above.
#[derive(Component)]
pub struct PlayerCamera;

/// Set up player movement systems.
pub fn setup_movement_systems(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        player_movement.run_if(in_state(PlayState::Running)),
    )
    .add_systems(Update, follow_player);
}

/// Planar direction from held WASD keys, in world axes (W is -Z).
pub fn input_direction(keyboard: &ButtonInput<KeyCode>) -> Vec3 {
    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    direction.normalize_or_zero()
}

/// Handle WASD movement.
///
/// Uses Rapier's KinematicCharacterController for collision detection.
pub fn player_movement(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    config: Res<PlayerConfig>,
    mut player_query: Query<
        (
            &PlayerVitals,
            &mut MovementState,
            &mut KinematicCharacterController,
            Option<&KinematicCharacterControllerOutput>,
        ),
        With<Player>,
    >,
) {
    let Ok((vitals, mut movement_state, mut controller, output)) = player_query.get_single_mut() else {
        return;
    };
    if !vitals.alive() {
        return;
    }

    let dt = time.delta_secs();
    movement_state.is_grounded = output.is_some_and(|out| out.grounded);
    if movement_state.is_grounded {
        movement_state.vertical_velocity = movement_state.vertical_velocity.max(0.0);
    } else {
        movement_state.vertical_velocity -= config.gravity * dt;
    }

    let speed = if keyboard.pressed(KeyCode::ShiftLeft) {
        config.move_speed * config.sprint_multiplier
    } else {
        config.move_speed
    };

    let horizontal = input_direction(&keyboard) * speed * dt;
    let vertical = Vec3::new(0.0, movement_state.vertical_velocity * dt, 0.0);
    controller.translation = Some(horizontal + vertical);
}

/// Keep the camera's tween target above and behind the player, looking at it.
pub fn follow_player(
    config: Res<PlayerConfig>,
    player_query: Query<&Transform, With<Player>>,
    mut camera_query: Query<&mut SmoothTransform, With<PlayerCamera>>,
) {
    let Ok(player) = player_query.get_single() else {
        return;
    };
    let Ok(mut smooth) = camera_query.get_single_mut() else {
        return;
    };

    let eye = player.translation + config.camera_offset;
    smooth.target_translation = Some(eye);
    smooth.target_rotation = Some(Transform::from_translation(eye).looking_at(player.translation, Vec3::Y).rotation);
}

/// Spawn the player entity and its follow camera.
pub fn spawn_player(commands: &mut Commands, position: Vec3, vitals: PlayerVitals, config: &PlayerConfig) -> Entity {
    let player = commands
        .spawn((
            Player,
            vitals,
            MovementState::default(),
            Transform::from_translation(position),
            Visibility::default(),
            // Rapier physics components
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.3),
            KinematicCharacterController {
                offset: CharacterLength::Absolute(0.01),
                autostep: Some(CharacterAutostep {
                    max_height: CharacterLength::Absolute(0.3),
                    min_width: CharacterLength::Absolute(0.3),
                    include_dynamic_bodies: false,
                }),
                max_slope_climb_angle: 45_f32.to_radians(),
                min_slope_slide_angle: 30_f32.to_radians(),
                snap_to_ground: Some(CharacterLength::Absolute(0.5)),
                ..default()
            },
        ))
        .id();

    let eye = position + config.camera_offset;
    commands.spawn((
        Camera3d::default(),
        PlayerCamera,
        Transform::from_translation(eye).looking_at(position, Vec3::Y),
        SmoothTransform::new(6.0, 6.0),
    ));

    player
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn diagonal_input_is_normalised() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyW);
        keyboard.press(KeyCode::KeyD);

        let direction = input_direction(&keyboard);

        assert_relative_eq!(direction.length(), 1.0, epsilon = 1e-6);
        assert!(direction.x > 0.0 && direction.z < 0.0);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyA);
        keyboard.press(KeyCode::KeyD);

        assert_eq!(input_direction(&keyboard), Vec3::ZERO);
    }

    #[test]
    fn vitals_report_death() {
        let mut vitals = PlayerVitals::new(200.0);
        assert!(vitals.alive());
        vitals.life = 0.0;
        assert!(!vitals.alive());
    }
}
