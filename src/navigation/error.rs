//! Error types for grid construction and path queries.

use thiserror::Error;

use super::grid::GridCell;

/// Reasons a navigation request could not be served.
///
/// Path queries surface these only through [`NavGrid::try_find_grid_path`];
/// the infallible query methods log them and return an empty path.
///
/// [`NavGrid::try_find_grid_path`]: super::NavGrid::try_find_grid_path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    /// Grid dimensions or world bounds are degenerate.
    #[error("Invalid grid: {width}x{height} cells over a {span_x}x{span_z} area")]
    InvalidGrid {
        width: usize,
        height: usize,
        span_x: f32,
        span_z: f32,
    },

    /// A query endpoint lies outside the grid.
    #[error("Cell {0} is outside the grid")]
    OutOfBounds(GridCell),

    /// The goal cell is an obstacle.
    #[error("Goal cell {0} is not walkable")]
    Blocked(GridCell),

    /// No walkable route connects the endpoints.
    #[error("No path between {start} and {goal}")]
    NoPath { start: GridCell, goal: GridCell },
}
