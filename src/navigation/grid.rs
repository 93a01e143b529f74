//! Walkability grid over the village floor and A* path queries.

use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;
use pathfinding::prelude::astar;
use serde::Deserialize;

use super::error::NavError;

/// Integer cell coordinate.
///
/// Signed so that mapping a point outside the world bounds still yields a
/// representable (out-of-range) cell instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
}

impl GridCell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// 4-connected step count between two cells.
    pub fn manhattan(self, other: GridCell) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Axis-aligned rectangle of the floor on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl WorldBounds {
    /// Square bounds centred on the origin.
    pub fn centered(half_extent: f32) -> Self {
        Self {
            min_x: -half_extent,
            max_x: half_extent,
            min_z: -half_extent,
            max_z: half_extent,
        }
    }

    /// Width (x) and depth (z) of the area.
    pub fn span(&self) -> Vec2 {
        Vec2::new(self.max_x - self.min_x, self.max_z - self.min_z)
    }

    /// Whether the point's XZ projection lies inside (max edges exclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min_x && point.x < self.max_x && point.z >= self.min_z && point.z < self.max_z
    }
}

/// What the enemy AI needs from a navigation layer.
///
/// "No path" is an ordinary answer (an empty vector), never an error.
pub trait NavigationService {
    /// Waypoints in world space from `start` to `goal`, or empty.
    fn find_path(&self, start: Vec3, goal: Vec3) -> Vec<Vec3>;

    /// Pull a point back inside the navigable area.
    fn clamp(&self, point: Vec3) -> Vec3;

    /// The point itself when an agent can stand there, otherwise the
    /// nearest place it can. `None` when nowhere is walkable.
    fn walkable_point(&self, point: Vec3) -> Option<Vec3>;
}

/// Navigation stand-in for worlds without a grid: no paths, no clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl NavigationService for OpenField {
    fn find_path(&self, _start: Vec3, _goal: Vec3) -> Vec<Vec3> {
        Vec::new()
    }

    fn clamp(&self, point: Vec3) -> Vec3 {
        point
    }

    fn walkable_point(&self, point: Vec3) -> Option<Vec3> {
        Some(point)
    }
}

/// Fixed-size walkability mask with a world-to-cell affine mapping.
#[derive(Debug, Clone)]
pub struct NavGrid {
    width: usize,
    height: usize,
    bounds: WorldBounds,
    walkable: Vec<bool>,
}

impl NavGrid {
    /// Create a fully walkable grid of `width` x `height` cells over `bounds`.
    pub fn new(width: usize, height: usize, bounds: WorldBounds) -> Result<Self, NavError> {
        let span = bounds.span();
        if width == 0 || height == 0 || !span.is_finite() || span.x <= 0.0 || span.y <= 0.0 {
            return Err(NavError::InvalidGrid {
                width,
                height,
                span_x: span.x,
                span_z: span.y,
            });
        }

        Ok(Self {
            width,
            height,
            bounds,
            walkable: vec![true; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// World-space size of one cell along x and z.
    pub fn cell_size(&self) -> Vec2 {
        self.bounds.span() / Vec2::new(self.width as f32, self.height as f32)
    }

    /// Dilation radius, in cells, for an agent whose body is `body_size` wide.
    pub fn footprint_cells(&self, body_size: f32) -> u32 {
        let cell = self.cell_size().min_element();
        ((body_size * 0.5) / cell).ceil().max(0.0) as u32
    }

    /// Whether the cell lies inside the grid.
    pub fn contains(&self, cell: GridCell) -> bool {
        self.index(cell).is_some()
    }

    /// Whether the cell is inside the grid and free of obstacles.
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.index(cell).is_some_and(|i| self.walkable[i])
    }

    /// Number of blocked cells.
    pub fn obstacle_count(&self) -> usize {
        self.walkable.iter().filter(|free| !**free).count()
    }

    /// Map a world position to the cell containing it. May be out of range.
    pub fn world_to_grid(&self, position: Vec3) -> GridCell {
        let cell = self.cell_size();
        GridCell::new(
            ((position.x - self.bounds.min_x) / cell.x).floor() as i32,
            ((position.z - self.bounds.min_z) / cell.y).floor() as i32,
        )
    }

    /// Map a cell to the world position of its centre (on the ground plane).
    pub fn grid_to_world(&self, cell: GridCell) -> Vec3 {
        let size = self.cell_size();
        Vec3::new(
            self.bounds.min_x + (cell.x as f32 + 0.5) * size.x,
            0.0,
            self.bounds.min_z + (cell.z as f32 + 0.5) * size.y,
        )
    }

    /// Mark a cell as unwalkable. Idempotent; returns `false` if the cell is
    /// outside the grid.
    pub fn set_obstacle(&mut self, cell: GridCell) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.walkable[i] = false;
                true
            }
            None => {
                warn!("Ignoring obstacle outside the navigation grid at {}", cell);
                false
            }
        }
    }

    /// Mark every cell under a rectangular footprint. Returns the number of
    /// cells touched.
    pub fn block_footprint(&mut self, center: Vec3, half_extents: Vec2) -> usize {
        let extent = Vec3::new(half_extents.x, 0.0, half_extents.y);
        let lo = self.world_to_grid(center - extent);
        let hi = self.world_to_grid(center + extent);

        let max_x = self.width as i32 - 1;
        let max_z = self.height as i32 - 1;
        let mut marked = 0;
        for z in lo.z.max(0)..=hi.z.min(max_z) {
            for x in lo.x.max(0)..=hi.x.min(max_x) {
                if let Some(i) = self.index(GridCell::new(x, z)) {
                    self.walkable[i] = false;
                    marked += 1;
                }
            }
        }

        if marked == 0 {
            warn!(
                "Obstacle at ({:.1}, {:.1}) lies outside the navigation grid",
                center.x, center.z
            );
        }
        marked
    }

    /// Copy of this grid with every obstacle grown by a square of `radius`
    /// cells. Growth is computed from this grid's mask only.
    pub fn dilated(&self, radius: u32) -> Self {
        let mut grown = self.clone();
        if radius == 0 {
            return grown;
        }

        let r = radius as i32;
        for z in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.is_walkable(GridCell::new(x, z)) {
                    continue;
                }
                for dz in -r..=r {
                    for dx in -r..=r {
                        if let Some(i) = grown.index(GridCell::new(x + dx, z + dz)) {
                            grown.walkable[i] = false;
                        }
                    }
                }
            }
        }
        grown
    }

    /// Shortest 4-connected path between two cells, start and goal included.
    ///
    /// The start cell may itself be blocked so an agent standing in a dilated
    /// margin can still walk out; the goal must be walkable.
    pub fn try_find_grid_path(&self, start: GridCell, goal: GridCell) -> Result<Vec<GridCell>, NavError> {
        if !self.contains(start) {
            return Err(NavError::OutOfBounds(start));
        }
        if !self.contains(goal) {
            return Err(NavError::OutOfBounds(goal));
        }
        if !self.is_walkable(goal) {
            return Err(NavError::Blocked(goal));
        }

        astar(
            &start,
            |cell| self.neighbours(*cell),
            |cell| cell.manhattan(goal),
            |cell| *cell == goal,
        )
        .map(|(path, _cost)| path)
        .ok_or(NavError::NoPath { start, goal })
    }

    /// Like [`Self::try_find_grid_path`], logging the rejection and returning
    /// an empty path on failure.
    pub fn find_grid_path(&self, start: GridCell, goal: GridCell) -> Vec<GridCell> {
        match self.try_find_grid_path(start, goal) {
            Ok(path) => path,
            Err(err @ NavError::OutOfBounds(_)) => {
                warn!("Path query rejected: {}", err);
                Vec::new()
            }
            Err(err) => {
                debug!("{}", err);
                Vec::new()
            }
        }
    }

    /// Closest walkable cell to `cell` by ring distance, `cell` included.
    pub fn nearest_walkable(&self, cell: GridCell) -> Option<GridCell> {
        if self.is_walkable(cell) {
            return Some(cell);
        }
        let reach = self.width.max(self.height) as i32;
        (1..=reach).find_map(|ring| {
            let mut candidates = Vec::new();
            for dz in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs() != ring && dz.abs() != ring {
                        continue;
                    }
                    let next = GridCell::new(cell.x + dx, cell.z + dz);
                    if self.is_walkable(next) {
                        candidates.push(next);
                    }
                }
            }
            candidates.into_iter().min_by_key(|next| {
                let (dx, dz) = (next.x - cell.x, next.z - cell.z);
                dx * dx + dz * dz
            })
        })
    }

    fn neighbours(&self, cell: GridCell) -> impl Iterator<Item = (GridCell, u32)> + '_ {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(move |(dx, dz)| GridCell::new(cell.x + dx, cell.z + dz))
            .filter(|next| self.is_walkable(*next))
            .map(|next| (next, 1))
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        if cell.x < 0 || cell.z < 0 {
            return None;
        }
        let (x, z) = (cell.x as usize, cell.z as usize);
        if x >= self.width || z >= self.height {
            return None;
        }
        Some(z * self.width + x)
    }
}

impl NavigationService for NavGrid {
    fn find_path(&self, start: Vec3, goal: Vec3) -> Vec<Vec3> {
        self.find_grid_path(self.world_to_grid(start), self.world_to_grid(goal))
            .into_iter()
            .map(|cell| self.grid_to_world(cell))
            .collect()
    }

    /// Clamp to the band of cell centres so the result always maps to a cell.
    fn clamp(&self, point: Vec3) -> Vec3 {
        let half = self.cell_size() * 0.5;
        Vec3::new(
            point.x.clamp(self.bounds.min_x + half.x, self.bounds.max_x - half.x),
            point.y,
            point.z.clamp(self.bounds.min_z + half.y, self.bounds.max_z - half.y),
        )
    }

    /// Snaps to a cell centre only when the point's own cell is blocked.
    fn walkable_point(&self, point: Vec3) -> Option<Vec3> {
        let point = self.clamp(point);
        let cell = self.world_to_grid(point);
        if self.is_walkable(cell) {
            return Some(point);
        }
        self.nearest_walkable(cell).map(|free| {
            let centre = self.grid_to_world(free);
            Vec3::new(centre.x, point.y, centre.z)
        })
    }
}

/// The village grid plus per-footprint dilated copies.
#[derive(Resource, Debug, Clone)]
pub struct NavGrids {
    base: NavGrid,
    dilated: HashMap<u32, NavGrid>,
}

impl NavGrids {
    pub fn new(base: NavGrid) -> Self {
        Self {
            base,
            dilated: HashMap::new(),
        }
    }

    pub fn base(&self) -> &NavGrid {
        &self.base
    }

    /// Build (once) the dilated grid for a footprint radius.
    pub fn prepare(&mut self, footprint: u32) {
        if footprint == 0 || self.dilated.contains_key(&footprint) {
            return;
        }
        let grown = self.base.dilated(footprint);
        debug!(
            "Prepared navigation grid for footprint {}: {} blocked cells",
            footprint,
            grown.obstacle_count()
        );
        self.dilated.insert(footprint, grown);
    }

    /// Grid for a footprint radius; the base grid if it was never prepared.
    pub fn for_footprint(&self, footprint: u32) -> &NavGrid {
        self.dilated.get(&footprint).unwrap_or(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn village_grid() -> NavGrid {
        NavGrid::new(100, 100, WorldBounds::centered(50.0)).unwrap()
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert!(matches!(
            NavGrid::new(0, 10, WorldBounds::centered(5.0)),
            Err(NavError::InvalidGrid { .. })
        ));
        assert!(NavGrid::new(10, 10, WorldBounds::centered(0.0)).is_err());
    }

    #[rstest]
    #[case(Vec3::new(0.0, 0.5, 0.0))]
    #[case(Vec3::new(-49.9, 0.0, 49.9))]
    #[case(Vec3::new(12.34, 0.0, -7.77))]
    #[case(Vec3::new(-50.0, 0.0, -50.0))]
    fn world_grid_round_trip_stays_within_one_cell(#[case] point: Vec3) {
        let grid = village_grid();
        let back = grid.grid_to_world(grid.world_to_grid(point));
        let cell = grid.cell_size();
        assert!((back.x - point.x).abs() <= cell.x);
        assert!((back.z - point.z).abs() <= cell.y);
    }

    #[test]
    fn cell_centres_map_back_to_their_cell() {
        let grid = NavGrid::new(37, 23, WorldBounds::centered(50.0)).unwrap();
        for cell in [GridCell::new(0, 0), GridCell::new(36, 22), GridCell::new(18, 5)] {
            assert_eq!(grid.world_to_grid(grid.grid_to_world(cell)), cell);
        }
    }

    #[test]
    fn cell_size_follows_bounds() {
        let grid = village_grid();
        assert_relative_eq!(grid.cell_size().x, 1.0);
        assert_relative_eq!(grid.grid_to_world(GridCell::new(0, 0)).x, -49.5);
    }

    #[test]
    fn open_grid_path_reaches_goal_cell() {
        let grid = village_grid();
        let start = GridCell::new(10, 10);
        let goal = GridCell::new(90, 90);

        let path = grid.find_grid_path(start, goal);

        assert!(!path.is_empty());
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn open_grid_path_progresses_monotonically() {
        let grid = village_grid();
        let goal = GridCell::new(90, 90);
        let path = grid.find_grid_path(GridCell::new(10, 10), goal);

        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
            assert_eq!(pair[1].manhattan(goal) + 1, pair[0].manhattan(goal));
        }
    }

    #[rstest]
    #[case(GridCell::new(-1, 10), GridCell::new(5, 5))]
    #[case(GridCell::new(5, 5), GridCell::new(100, 3))]
    #[case(GridCell::new(5, 500), GridCell::new(5, 5))]
    fn out_of_bounds_queries_return_empty(#[case] start: GridCell, #[case] goal: GridCell) {
        let grid = village_grid();
        assert!(grid.find_grid_path(start, goal).is_empty());
        assert!(matches!(grid.try_find_grid_path(start, goal), Err(NavError::OutOfBounds(_))));
    }

    #[test]
    fn world_queries_outside_bounds_return_empty() {
        let grid = village_grid();
        assert!(grid.find_path(Vec3::new(70.0, 0.0, 0.0), Vec3::ZERO).is_empty());
    }

    #[test]
    fn set_obstacle_is_idempotent() {
        let mut grid = village_grid();
        let cell = GridCell::new(3, 4);

        assert!(grid.set_obstacle(cell));
        assert!(grid.set_obstacle(cell));

        assert!(!grid.is_walkable(cell));
        assert_eq!(grid.obstacle_count(), 1);
        assert!(!grid.set_obstacle(GridCell::new(-3, 4)));
    }

    #[test]
    fn blocked_goal_is_rejected() {
        let mut grid = village_grid();
        let goal = GridCell::new(20, 20);
        grid.set_obstacle(goal);

        assert_eq!(grid.try_find_grid_path(GridCell::new(0, 0), goal), Err(NavError::Blocked(goal)));
    }

    #[test]
    fn walled_off_goal_has_no_path() {
        let mut grid = NavGrid::new(10, 10, WorldBounds::centered(5.0)).unwrap();
        for z in 0..10 {
            grid.set_obstacle(GridCell::new(5, z));
        }

        let path = grid.find_grid_path(GridCell::new(1, 1), GridCell::new(8, 8));

        assert!(path.is_empty());
    }

    #[test]
    fn path_detours_around_wall_gap() {
        let mut grid = NavGrid::new(10, 10, WorldBounds::centered(5.0)).unwrap();
        for z in 0..9 {
            grid.set_obstacle(GridCell::new(5, z));
        }

        let path = grid.find_grid_path(GridCell::new(1, 1), GridCell::new(8, 1));

        assert!(path.contains(&GridCell::new(5, 9)));
        assert!(path.iter().all(|cell| grid.is_walkable(*cell)));
    }

    #[test]
    fn blocked_start_can_still_leave() {
        let mut grid = village_grid();
        let start = GridCell::new(50, 50);
        grid.set_obstacle(start);

        assert!(!grid.find_grid_path(start, GridCell::new(55, 50)).is_empty());
    }

    #[test]
    fn footprint_blocks_every_covered_cell() {
        let mut grid = village_grid();
        // A 6x6 house centred between cells covers 7x7 cells once the far
        // edge is rounded down into the neighbouring cell.
        let marked = grid.block_footprint(Vec3::new(-12.0, 2.0, 12.0), Vec2::new(3.0, 3.0));

        assert_eq!(marked, 49);
        assert!(!grid.is_walkable(grid.world_to_grid(Vec3::new(-12.0, 0.0, 12.0))));
        assert!(grid.is_walkable(grid.world_to_grid(Vec3::new(-16.0, 0.0, 12.0))));
    }

    #[test]
    fn dilation_grows_without_cascading() {
        let mut grid = NavGrid::new(11, 11, WorldBounds::centered(5.5)).unwrap();
        grid.set_obstacle(GridCell::new(5, 5));

        let grown = grid.dilated(1);

        assert_eq!(grown.obstacle_count(), 9);
        assert!(!grown.is_walkable(GridCell::new(4, 6)));
        assert!(grown.is_walkable(GridCell::new(3, 5)));
        assert_eq!(grid.obstacle_count(), 1);
    }

    #[test]
    fn footprint_cells_scale_with_body_size() {
        let grid = village_grid();
        assert_eq!(grid.footprint_cells(1.0), 1);
        assert_eq!(grid.footprint_cells(3.0), 2);
        assert_eq!(grid.footprint_cells(0.0), 0);
    }

    #[test]
    fn clamp_keeps_points_on_cells() {
        let grid = village_grid();
        let clamped = grid.clamp(Vec3::new(80.0, 0.5, -80.0));

        assert_relative_eq!(clamped.x, 49.5);
        assert_relative_eq!(clamped.z, -49.5);
        assert_relative_eq!(clamped.y, 0.5);
        assert!(grid.contains(grid.world_to_grid(clamped)));
    }

    #[test]
    fn walkable_points_pass_through() {
        let grid = village_grid();
        let point = Vec3::new(3.3, 0.5, -7.1);
        assert_eq!(grid.walkable_point(point), Some(point));
    }

    #[test]
    fn blocked_points_snap_to_the_closest_free_cell() {
        let mut grid = village_grid();
        grid.block_footprint(Vec3::new(-12.0, 2.0, 12.0), Vec2::new(3.0, 3.0));
        let inside = Vec3::new(-9.6, 0.5, 12.2);

        let snapped = grid.walkable_point(inside).unwrap();

        assert!(grid.is_walkable(grid.world_to_grid(snapped)));
        assert_relative_eq!(snapped.x, -7.5);
        assert_relative_eq!(snapped.z, 12.5);
        assert_relative_eq!(snapped.y, 0.5);
    }

    #[test]
    fn fully_blocked_grid_has_no_walkable_point() {
        let mut grid = NavGrid::new(4, 4, WorldBounds::centered(2.0)).unwrap();
        grid.block_footprint(Vec3::ZERO, Vec2::splat(2.0));

        assert_eq!(grid.walkable_point(Vec3::ZERO), None);
        assert_eq!(OpenField.walkable_point(Vec3::ZERO), Some(Vec3::ZERO));
    }

    #[test]
    fn nav_grids_fall_back_to_base() {
        let mut base = village_grid();
        base.set_obstacle(GridCell::new(10, 10));
        let mut grids = NavGrids::new(base);

        assert_eq!(grids.for_footprint(2).obstacle_count(), 1);
        grids.prepare(2);
        assert_eq!(grids.for_footprint(2).obstacle_count(), 25);
        assert_eq!(grids.base().obstacle_count(), 1);
    }
}
