//! Enemy-related components.

use bevy::prelude::*;

/// Marker component for all enemies.
#[derive(Component)]
pub struct Enemy;

/// Archetype identifier (matches the RON file name).
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EnemyType(pub String);

/// Dilation radius, in cells, of the grid this enemy paths on.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavFootprint(pub u32);

/// Child entity carrying the enemy's mesh. Turned toward the heading.
#[derive(Component)]
pub struct EnemyVisual;
