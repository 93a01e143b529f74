//! Core game module - states, events, and fundamental systems.
//!
//! This module provides the foundation that all other game systems build upon.

mod events;
mod plugin;
mod rng;
mod states;
mod tween;

pub use events::*;
pub use plugin::{CorePlugin, SIMULATION_HZ};
pub use rng::GameRng;
pub use states::*;
pub use tween::*;
