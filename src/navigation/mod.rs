//! Navigation module - walkability grid, world/grid mapping and pathfinding.

mod error;
mod grid;

pub use error::NavError;
pub use grid::{GridCell, NavGrid, NavGrids, NavigationService, OpenField, WorldBounds};
