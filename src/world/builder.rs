//! Village construction from the layout.

use bevy::prelude::*;
use rand::Rng;

use super::data::{scatter, ObstacleKind, VillageLayout, SPAWN_HEIGHT};
use super::pickups::{Collectible, Goal};
use crate::physics::{fixed_body, BodyShape};

/// Marker for all village entities that should be cleaned up.
#[derive(Component)]
pub struct VillageGeometry;

const GROUND_THICKNESS: f32 = 0.1;

struct VillageMaterials {
    ground: Handle<StandardMaterial>,
    house: Handle<StandardMaterial>,
    trunk: Handle<StandardMaterial>,
    foliage: Handle<StandardMaterial>,
    post: Handle<StandardMaterial>,
    goal: Handle<StandardMaterial>,
    collectible: Handle<StandardMaterial>,
}

impl VillageMaterials {
    fn new(materials: &mut Assets<StandardMaterial>) -> Self {
        let mut solid = |r, g, b| materials.add(Color::srgb(r, g, b));
        Self {
            ground: solid(0.3, 0.5, 0.25),
            house: solid(0.6, 0.45, 0.3),
            trunk: solid(0.4, 0.25, 0.1),
            foliage: solid(0.1, 0.45, 0.15),
            post: solid(0.5, 0.4, 0.3),
            goal: solid(0.1, 0.4, 0.9),
            collectible: solid(1.0, 0.9, 0.0),
        }
    }
}

/// Spawn the ground, lights, static obstacles, the goal and collectibles.
pub fn build_village(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    layout: &VillageLayout,
    rng: &mut impl Rng,
) {
    let palette = VillageMaterials::new(materials);

    setup_environment(commands);
    spawn_ground(commands, meshes, &palette, layout);
    spawn_obstacles(commands, meshes, &palette, layout);
    spawn_goal(commands, meshes, &palette, layout);
    spawn_collectibles(commands, meshes, &palette, layout, rng);
}

fn setup_environment(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
        VillageGeometry,
    ));
}

fn spawn_ground(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    palette: &VillageMaterials,
    layout: &VillageLayout,
) {
    let span = layout.bounds.span();
    let center = Vec3::new(
        (layout.bounds.min_x + layout.bounds.max_x) * 0.5,
        -GROUND_THICKNESS * 0.5,
        (layout.bounds.min_z + layout.bounds.max_z) * 0.5,
    );

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(span.x, GROUND_THICKNESS, span.y))),
        MeshMaterial3d(palette.ground.clone()),
        fixed_body(
            BodyShape::Cuboid {
                half_extents: Vec3::new(span.x * 0.5, GROUND_THICKNESS * 0.5, span.y * 0.5),
            },
            center,
        ),
        VillageGeometry,
    ));
}

fn spawn_obstacles(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    palette: &VillageMaterials,
    layout: &VillageLayout,
) {
    let foliage_mesh = meshes.add(Sphere::new(1.2));

    for obstacle in layout.obstacles() {
        let material = match obstacle.kind {
            ObstacleKind::House => palette.house.clone(),
            ObstacleKind::Trunk => palette.trunk.clone(),
            ObstacleKind::FencePost => palette.post.clone(),
        };
        let size = obstacle.half_extents * 2.0;

        let mut entity = commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(material),
            fixed_body(
                BodyShape::Cuboid {
                    half_extents: obstacle.half_extents,
                },
                obstacle.center,
            ),
            Visibility::default(),
            VillageGeometry,
        ));

        if obstacle.kind == ObstacleKind::Trunk {
            entity.with_children(|tree| {
                tree.spawn((
                    Mesh3d(foliage_mesh.clone()),
                    MeshMaterial3d(palette.foliage.clone()),
                    Transform::from_xyz(0.0, obstacle.half_extents.y + 0.6, 0.0),
                ));
            });
        }
    }
}

fn spawn_goal(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    palette: &VillageMaterials,
    layout: &VillageLayout,
) {
    commands.spawn((
        Goal,
        Mesh3d(meshes.add(Cylinder::new(0.6, 0.1))),
        MeshMaterial3d(palette.goal.clone()),
        Transform::from_translation(layout.goal_origin() + Vec3::Y * 0.05),
        VillageGeometry,
    ));
}

fn spawn_collectibles(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    palette: &VillageMaterials,
    layout: &VillageLayout,
    rng: &mut impl Rng,
) {
    let mesh = meshes.add(Sphere::new(0.5));
    let rules = &layout.collectibles;

    for _ in 0..rules.count {
        let position = scatter(Vec3::new(0.0, SPAWN_HEIGHT, 0.0), rules.spread, rng);
        commands.spawn((
            Collectible { value: rules.value },
            Mesh3d(mesh.clone()),
            MeshMaterial3d(palette.collectible.clone()),
            Transform::from_translation(position),
            VillageGeometry,
        ));
    }
}
