//! Errors raised while validating enemy archetypes and spawn requests.

use thiserror::Error;

/// Rejected enemy configuration or spawn request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnemyConfigError {
    /// A radius, speed or force that must be strictly positive is not.
    #[error("'{archetype}': {field} must be positive and finite, got {value}")]
    NonPositive {
        archetype: String,
        field: &'static str,
        value: f32,
    },

    /// A duration or radius that may be zero is negative or not finite.
    #[error("'{archetype}': {field} must be zero or positive, got {value}")]
    Negative {
        archetype: String,
        field: &'static str,
        value: f32,
    },

    /// Field-of-view half-angle outside (0, π].
    #[error("'{archetype}': field of view half-angle must lie in (0, π], got {value}")]
    FieldOfView { archetype: String, value: f32 },

    /// A force-steered archetype whose patrol force cannot break static
    /// friction on the ground.
    #[error("'{archetype}': patrol force of {drive} N does not overcome {grip} N of friction")]
    WeakDrive { archetype: String, drive: f32, grip: f32 },

    #[error("Unknown enemy archetype '{0}'")]
    UnknownArchetype(String),

    /// Something the enemy needs at runtime is not present in the world.
    #[error("Cannot spawn '{archetype}': no {missing} available")]
    MissingCollaborator {
        archetype: String,
        missing: &'static str,
    },
}
