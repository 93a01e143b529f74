//! Core plugin that sets up game states, events, and fundamental systems.

use bevy::prelude::*;

use super::events::*;
use super::rng::GameRng;
use super::states::*;
use super::tween::*;

/// Fixed simulation rate shared by physics and enemy AI.
pub const SIMULATION_HZ: f64 = 60.0;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, InGame) and the pause sub-state
/// - Global events (pickups, level completion, enemy alarms)
/// - The fixed 60 Hz simulation clock and the shared RNG
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            .init_state::<GameState>()
            .add_sub_state::<PlayState>()
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .init_resource::<GameRng>()

            .add_event::<ItemPickupEvent>()
            .add_event::<LevelCompleted>()
            .add_event::<EnemyAlarmRaised>()

            // Data files are read at Startup, so the village can be built
            // on the first frame.
            .add_systems(OnEnter(GameState::Loading), enter_game)

            .add_systems(Update, handle_pause_input.run_if(in_state(GameState::InGame)))
            .add_systems(Update, update_smooth_transforms);
    }
}

fn enter_game(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

/// Handle Escape key to pause/unpause the game.
fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current_state: Res<State<PlayState>>,
    mut next_state: ResMut<NextState<PlayState>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        match current_state.get() {
            PlayState::Running => next_state.set(PlayState::Paused),
            PlayState::Paused => next_state.set(PlayState::Running),
        }
    }
}
