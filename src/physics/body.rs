//! Body proxy trait, its rapier implementation and body bundles.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Magnitude of the rapier world's default gravity.
pub const GRAVITY: f32 = 9.81;

/// What an agent may do to its own rigid body.
///
/// Movement is planar: the AI never writes the vertical component, so
/// gravity and contacts keep control of it.
pub trait PhysicsBody {
    /// Position as of the most recent world step.
    fn position(&self) -> Vec3;

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    /// Replace the horizontal velocity, keeping the vertical component.
    fn set_planar_velocity(&mut self, vx: f32, vz: f32) {
        let current = self.velocity();
        self.set_velocity(Vec3::new(vx, current.y, vz));
    }

    /// Horizontal force for the next step. Replaces any previous force.
    fn apply_force(&mut self, fx: f32, fz: f32);
}

/// Borrowed view of an entity's rapier components.
pub struct RapierBody<'a> {
    transform: &'a Transform,
    velocity: &'a mut Velocity,
    force: &'a mut ExternalForce,
}

impl<'a> RapierBody<'a> {
    pub fn new(transform: &'a Transform, velocity: &'a mut Velocity, force: &'a mut ExternalForce) -> Self {
        Self {
            transform,
            velocity,
            force,
        }
    }
}

impl PhysicsBody for RapierBody<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn velocity(&self) -> Vec3 {
        self.velocity.linvel
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity.linvel = velocity;
    }

    fn apply_force(&mut self, fx: f32, fz: f32) {
        // Rapier keeps an ExternalForce applied every step until changed.
        self.force.force = Vec3::new(fx, 0.0, fz);
    }
}

/// Collision shape of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    Cylinder { half_height: f32, radius: f32 },
}

impl BodyShape {
    pub fn collider(&self) -> Collider {
        match *self {
            BodyShape::Cuboid { half_extents } => Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            BodyShape::Cylinder { half_height, radius } => Collider::cylinder(half_height, radius),
        }
    }

    /// Widest horizontal extent, used to size navigation footprints.
    pub fn width(&self) -> f32 {
        match *self {
            BodyShape::Cuboid { half_extents } => 2.0 * half_extents.x.max(half_extents.z),
            BodyShape::Cylinder { radius, .. } => 2.0 * radius,
        }
    }
}

/// Components for a dynamic, upright body that the AI steers.
pub fn dynamic_body(shape: BodyShape, mass: f32, start: Vec3) -> impl Bundle {
    (
        RigidBody::Dynamic,
        shape.collider(),
        ColliderMassProperties::Mass(mass),
        Velocity::zero(),
        ExternalForce::default(),
        LockedAxes::ROTATION_LOCKED,
        Sleeping::disabled(),
        Transform::from_translation(start),
    )
}

/// Contact material for an agent body. A contact pair takes the lower
/// friction of the two, so a frictionless agent slides on any floor.
pub fn agent_material(friction: f32, restitution: f32) -> impl Bundle {
    (
        Friction {
            coefficient: friction,
            combine_rule: CoefficientCombineRule::Min,
        },
        Restitution::coefficient(restitution),
    )
}

/// Components for an immovable obstacle.
pub fn fixed_body(shape: BodyShape, position: Vec3) -> impl Bundle {
    (RigidBody::Fixed, shape.collider(), Transform::from_translation(position))
}

/// Explicit-Euler point mass for exercising steering without a physics world.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct PointMass {
    pub position: Vec3,
    pub velocity: Vec3,
    pub force: Vec3,
    pub mass: f32,
    pub damping: f32,
}

#[cfg(test)]
impl PointMass {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            mass: 1.0,
            ..Default::default()
        }
    }

    pub fn step(&mut self, dt: f32) {
        self.velocity += self.force / self.mass * dt;
        self.velocity *= 1.0 / (1.0 + dt * self.damping);
        self.position += self.velocity * dt;
    }
}

#[cfg(test)]
impl PhysicsBody for PointMass {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn apply_force(&mut self, fx: f32, fz: f32) {
        self.force = Vec3::new(fx, 0.0, fz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_velocity_keeps_vertical_component() {
        let transform = Transform::from_xyz(1.0, 0.5, 2.0);
        let mut velocity = Velocity::linear(Vec3::new(0.0, -3.0, 0.0));
        let mut force = ExternalForce::default();

        let mut body = RapierBody::new(&transform, &mut velocity, &mut force);
        body.set_planar_velocity(0.8, -0.4);

        assert_eq!(body.position(), Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(velocity.linvel, Vec3::new(0.8, -3.0, -0.4));
    }

    #[test]
    fn apply_force_replaces_previous_force() {
        let transform = Transform::default();
        let mut velocity = Velocity::zero();
        let mut force = ExternalForce {
            force: Vec3::new(3.0, 9.0, 3.0),
            torque: Vec3::Y,
        };

        let mut body = RapierBody::new(&transform, &mut velocity, &mut force);
        body.apply_force(10.0, 0.0);

        assert_eq!(force.force, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(force.torque, Vec3::Y);
    }

    #[test]
    fn shape_width_uses_widest_horizontal_extent() {
        let crate_shape = BodyShape::Cuboid {
            half_extents: Vec3::new(0.5, 2.0, 0.75),
        };
        let pillar = BodyShape::Cylinder {
            half_height: 0.5,
            radius: 0.3,
        };

        assert_relative_eq!(crate_shape.width(), 1.5);
        assert_relative_eq!(pillar.width(), 0.6);
    }

    #[test]
    fn agent_friction_takes_the_lower_coefficient() {
        let mut world = World::new();
        let entity = world.spawn(agent_material(0.0, 0.1)).id();

        let friction = world.get::<Friction>(entity).unwrap();
        assert_eq!(friction.coefficient, 0.0);
        assert_eq!(friction.combine_rule, CoefficientCombineRule::Min);
        assert_eq!(world.get::<Restitution>(entity).unwrap().coefficient, 0.1);
    }

    #[test]
    fn point_mass_accelerates_under_force() {
        let mut body = PointMass::at(Vec3::ZERO);
        body.apply_force(1.0, 0.0);
        for _ in 0..60 {
            body.step(1.0 / 60.0);
        }

        assert_relative_eq!(body.velocity.x, 1.0, epsilon = 1e-4);
        assert!(body.position.x > 0.4 && body.position.x < 0.6);
    }
}
