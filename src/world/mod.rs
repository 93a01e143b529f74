//! World module - village layout, static obstacles and pickups.

mod builder;
mod data;
mod error;
mod pickups;
mod plugin;

pub use builder::VillageGeometry;
pub use data::{scatter, GarrisonDef, Obstacle, ObstacleKind, VillageLayout, SPAWN_HEIGHT};
pub use error::DataLoadError;
pub use pickups::{Collectible, Goal, Progress};
pub use plugin::{setup_village, WorldPlugin};
