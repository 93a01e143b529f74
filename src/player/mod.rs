//! Player module - player entity, movement, and follow camera.

mod components;
mod movement;
mod plugin;

pub use components::*;
pub use movement::{spawn_player, PlayerCamera};
pub use plugin::PlayerPlugin;
