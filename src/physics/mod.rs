//! Physics module - per-agent body handles over the shared rapier world.

mod body;
mod plugin;

pub use body::{agent_material, dynamic_body, fixed_body, BodyShape, PhysicsBody, RapierBody, GRAVITY};
pub use plugin::PhysicsPlugin;

#[cfg(test)]
pub use body::PointMass;
