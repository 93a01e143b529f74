//! Global events used for cross-system communication.
//!
//! Pickups, level progression and enemy alarms are announced here so the
//! world, the population manager and any observers stay decoupled.

use bevy::prelude::*;

/// Sent when the player picks up an item.
#[derive(Event)]
pub struct ItemPickupEvent {
    /// The item entity being picked up
    pub item: Entity,
    /// The player entity
    pub player: Entity,
    /// Score awarded
    pub value: u32,
}

/// Sent when the player reaches the goal.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelCompleted {
    /// Level that was just finished (first level is 1)
    pub level: u32,
}

/// Sent when an enemy spots the player and alerts its neighbours.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyAlarmRaised {
    pub enemy: Entity,
    pub origin: Vec3,
    /// Neighbours that joined the chase
    pub roused: usize,
}
