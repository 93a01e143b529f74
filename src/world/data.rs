//! Village layout loaded from RON.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::error::DataLoadError;
use crate::navigation::{NavGrid, WorldBounds};

/// Layout file read when entering the game.
pub const VILLAGE_LAYOUT_PATH: &str = "assets/data/village.ron";

const BUILTIN_LAYOUT: &str = include_str!("../../assets/data/village.ron");

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PlayerDef {
    pub start: (f32, f32, f32),
    pub life: f32,
}

/// Box-shaped building.
#[derive(Deserialize, Clone, Debug)]
pub struct HouseDef {
    pub center: (f32, f32, f32),
    pub size: (f32, f32, f32),
}

/// Straight run of fence posts from `from` to `to` (x, z), inclusive.
#[derive(Deserialize, Clone, Debug)]
pub struct FenceDef {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub spacing: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GoalDef {
    pub position: (f32, f32, f32),
    /// Half-width of the square the goal is moved within after each level.
    pub scatter: f32,
    pub reach: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CollectibleDef {
    pub count: usize,
    pub value: u32,
    /// Half-width of the square around the origin items are scattered in.
    pub spread: f32,
    pub reach: f32,
}

/// A group of enemies placed when the game starts.
#[derive(Deserialize, Clone, Debug)]
pub struct GarrisonDef {
    pub archetype: String,
    pub count: usize,
    pub center: (f32, f32),
    pub spread: f32,
}

/// What kind of static obstacle a footprint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    House,
    Trunk,
    FencePost,
}

/// Static box obstacle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub center: Vec3,
    pub half_extents: Vec3,
}

const TRUNK_HALF_EXTENTS: Vec3 = Vec3::new(0.25, 1.5, 0.25);
const POST_HALF_EXTENTS: Vec3 = Vec3::new(0.1, 0.5, 0.1);

/// Height enemies and pickups are placed at.
pub const SPAWN_HEIGHT: f32 = 0.5;

/// Complete village description.
#[derive(Resource, Deserialize, Clone, Debug)]
pub struct VillageLayout {
    pub name: String,
    pub bounds: WorldBounds,
    pub grid: GridSize,
    pub player: PlayerDef,
    #[serde(default)]
    pub houses: Vec<HouseDef>,
    /// Tree positions (x, z).
    #[serde(default)]
    pub trees: Vec<(f32, f32)>,
    #[serde(default)]
    pub fences: Vec<FenceDef>,
    pub goal: GoalDef,
    pub collectibles: CollectibleDef,
    #[serde(default)]
    pub garrison: Vec<GarrisonDef>,
    /// Archetype appended each time a level is completed.
    pub reinforcement: String,
}

impl VillageLayout {
    /// The layout shipped with the game.
    pub fn builtin() -> Result<Self, DataLoadError> {
        parse_layout(BUILTIN_LAYOUT, "builtin village")
    }

    pub fn player_start(&self) -> Vec3 {
        Vec3::from(self.player.start)
    }

    pub fn goal_origin(&self) -> Vec3 {
        Vec3::from(self.goal.position)
    }

    /// Every static obstacle: houses, tree trunks and fence posts.
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let houses = self.houses.iter().map(|house| Obstacle {
            kind: ObstacleKind::House,
            center: Vec3::from(house.center),
            half_extents: Vec3::from(house.size) * 0.5,
        });
        let trunks = self.trees.iter().map(|&(x, z)| Obstacle {
            kind: ObstacleKind::Trunk,
            center: Vec3::new(x, TRUNK_HALF_EXTENTS.y, z),
            half_extents: TRUNK_HALF_EXTENTS,
        });
        let posts = self.fences.iter().flat_map(|fence| {
            fence.posts().map(|(x, z)| Obstacle {
                kind: ObstacleKind::FencePost,
                center: Vec3::new(x, POST_HALF_EXTENTS.y, z),
                half_extents: POST_HALF_EXTENTS,
            })
        });
        houses.chain(trunks).chain(posts).collect()
    }

    /// Walkability grid with every obstacle footprint blocked.
    pub fn nav_grid(&self) -> Result<NavGrid, DataLoadError> {
        let mut grid = NavGrid::new(self.grid.width, self.grid.height, self.bounds)?;
        for obstacle in self.obstacles() {
            grid.block_footprint(
                obstacle.center,
                Vec2::new(obstacle.half_extents.x, obstacle.half_extents.z),
            );
        }
        Ok(grid)
    }

    fn validate(&self, origin: &str) -> Result<(), DataLoadError> {
        let invalid = |details: String| DataLoadError::InvalidLayout {
            path: origin.to_string(),
            details,
        };

        if let Some(fence) = self.fences.iter().find(|f| !(f.spacing.is_finite() && f.spacing > 0.0)) {
            return Err(invalid(format!("fence spacing must be positive, got {}", fence.spacing)));
        }
        if let Some(group) = self.garrison.iter().find(|g| !(g.spread.is_finite() && g.spread >= 0.0)) {
            return Err(invalid(format!("garrison '{}' has invalid spread {}", group.archetype, group.spread)));
        }
        if !(self.collectibles.spread.is_finite() && self.collectibles.spread >= 0.0) {
            return Err(invalid(format!("collectible spread must not be negative, got {}", self.collectibles.spread)));
        }
        if !(self.goal.scatter.is_finite() && self.goal.scatter >= 0.0) {
            return Err(invalid(format!("goal scatter must not be negative, got {}", self.goal.scatter)));
        }
        if !self.bounds.contains(self.player_start()) {
            return Err(invalid("player start lies outside the village bounds".to_string()));
        }
        Ok(())
    }
}

impl FenceDef {
    /// Post positions (x, z) along the run.
    pub fn posts(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let from = Vec2::from(self.from);
        let run = Vec2::from(self.to) - from;
        let count = (run.length() / self.spacing).floor() as usize;
        let step = run.normalize_or_zero() * self.spacing;
        (0..=count).map(move |i| {
            let post = from + step * i as f32;
            (post.x, post.y)
        })
    }
}

impl GarrisonDef {
    /// Random spawn position in the group's square.
    pub fn spawn_point(&self, rng: &mut impl Rng) -> Vec3 {
        scatter(Vec3::new(self.center.0, SPAWN_HEIGHT, self.center.1), self.spread, rng)
    }
}

/// Uniform point in the square of half-width `spread` around `center` (x, z).
pub fn scatter(center: Vec3, spread: f32, rng: &mut impl Rng) -> Vec3 {
    if spread <= 0.0 {
        return center;
    }
    center + Vec3::new(rng.gen_range(-spread..=spread), 0.0, rng.gen_range(-spread..=spread))
}

/// Parse and validate a layout. `origin` names the source in errors.
pub fn parse_layout(source: &str, origin: &str) -> Result<VillageLayout, DataLoadError> {
    let layout: VillageLayout = ron::from_str(source).map_err(|e| DataLoadError::ParseError {
        path: origin.to_string(),
        details: e.to_string(),
    })?;
    layout.validate(origin)?;
    Ok(layout)
}

fn read_layout(path: &Path) -> Result<VillageLayout, DataLoadError> {
    let origin = path.display().to_string();
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(origin));
    }
    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: origin.clone(),
        details: e.to_string(),
    })?;
    parse_layout(&contents, &origin)
}

/// Load the village layout, falling back to the built-in copy.
pub fn load_village_layout(mut commands: Commands) {
    let layout = match read_layout(Path::new(VILLAGE_LAYOUT_PATH)) {
        Ok(layout) => layout,
        Err(e) => {
            warn!("{}; using built-in village", e);
            match VillageLayout::builtin() {
                Ok(layout) => layout,
                Err(e) => {
                    error!("Built-in village is invalid: {}", e);
                    return;
                }
            }
        }
    };

    info!(
        "Loaded village '{}': {} houses, {} trees, {} fences, {} garrison groups",
        layout.name,
        layout.houses.len(),
        layout.trees.len(),
        layout.fences.len(),
        layout.garrison.len()
    );
    commands.insert_resource(layout);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationService;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layout() -> VillageLayout {
        VillageLayout::builtin().unwrap()
    }

    #[test]
    fn builtin_layout_parses() {
        let layout = layout();
        assert_eq!(layout.houses.len(), 2);
        assert_eq!(layout.trees.len(), 10);
        assert_eq!(layout.grid.width, 100);
        assert_eq!(layout.reinforcement, "sentinel");
    }

    #[test]
    fn fences_place_posts_every_spacing() {
        let fence = FenceDef {
            from: (-20.0, -20.0),
            to: (20.0, -20.0),
            spacing: 2.0,
        };
        let posts: Vec<_> = fence.posts().collect();

        assert_eq!(posts.len(), 21);
        assert_eq!(posts.first(), Some(&(-20.0, -20.0)));
        assert_eq!(posts.last(), Some(&(20.0, -20.0)));
    }

    #[test]
    fn nav_grid_blocks_houses_but_not_the_square() {
        let layout = layout();
        let grid = layout.nav_grid().unwrap();

        for house in &layout.houses {
            let center = Vec3::from(house.center);
            assert!(!grid.is_walkable(grid.world_to_grid(center)));
        }
        assert!(grid.is_walkable(grid.world_to_grid(layout.player_start())));
        assert!(grid.is_walkable(grid.world_to_grid(layout.goal_origin())));
    }

    #[test]
    fn paths_route_around_houses() {
        let layout = layout();
        let grid = layout.nav_grid().unwrap();
        let house = Vec3::from(layout.houses[0].center);

        let path = grid.find_path(house + Vec3::new(-6.0, 0.0, 0.0), house + Vec3::new(6.0, 0.0, 0.0));

        assert!(!path.is_empty());
        assert!(path.iter().all(|p| grid.is_walkable(grid.world_to_grid(*p))));
    }

    #[test]
    fn zero_spacing_fence_is_rejected() {
        let source = BUILTIN_LAYOUT.replace("spacing: 2.0", "spacing: 0.0");
        assert!(matches!(
            parse_layout(&source, "bad fence"),
            Err(DataLoadError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn garrison_points_stay_in_their_square() {
        let group = GarrisonDef {
            archetype: "sentinel".to_string(),
            count: 5,
            center: (2.0, -3.0),
            spread: 5.0,
        };
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let point = group.spawn_point(&mut rng);
            assert!((point.x - 2.0).abs() <= 5.0);
            assert!((point.z + 3.0).abs() <= 5.0);
            assert_eq!(point.y, SPAWN_HEIGHT);
        }
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            read_layout(Path::new("no/such/village.ron")),
            Err(DataLoadError::FileNotFound(_))
        ));
    }
}
