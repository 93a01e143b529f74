//! Enemy archetype loading from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_4, PI};
use std::fs;
use std::path::Path;

use super::error::EnemyConfigError;
use super::tuning::{Alert, BodyTuning, EnemyTuning, Pursuit, Steering};
use crate::physics::{BodyShape, GRAVITY};
use crate::world::DataLoadError;

/// Directory scanned for `*.ron` archetype files.
pub const ENEMY_DATA_DIR: &str = "assets/data/enemies";

/// Collider configuration for an enemy type.
#[derive(Deserialize, Clone, Debug)]
pub struct ColliderConfig {
    pub half_height: f32,
    pub radius: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            half_height: 0.5,
            radius: 0.5,
        }
    }
}

/// Rigid body material and damping.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            friction: 0.8,
            restitution: 0.1,
            linear_damping: 0.2,
            angular_damping: 0.2,
        }
    }
}

/// Enemy definition loaded from RON file.
#[derive(Deserialize, Clone, Debug)]
pub struct EnemyDefinition {
    pub name: String,
    pub speed: f32,
    pub detection_radius: f32,
    /// Half-angle of the view cone in radians. `None` sees all around.
    #[serde(default)]
    pub field_of_view: Option<f32>,
    pub patrol_radius: f32,
    #[serde(default = "default_patrol_factor")]
    pub patrol_factor: f32,
    #[serde(default)]
    pub reaction_delay: f32,
    pub pursuit: Pursuit,
    pub steering: Steering,
    #[serde(default)]
    pub alert: Option<Alert>,
    #[serde(default)]
    pub collider: Option<ColliderConfig>,
    #[serde(default)]
    pub body: BodyConfig,
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
}

fn default_patrol_factor() -> f32 {
    0.5
}

fn default_color() -> (f32, f32, f32) {
    (0.8, 0.1, 0.1)
}

impl EnemyDefinition {
    /// Slow orbiting guard that steers by velocity.
    pub fn sentinel() -> Self {
        Self {
            name: "Sentinel".to_string(),
            speed: 0.8,
            detection_radius: 15.0,
            field_of_view: None,
            patrol_radius: 10.0,
            patrol_factor: 0.5,
            reaction_delay: 0.0,
            pursuit: Pursuit::Orbit {
                radius: 2.0,
                angular_speed: 1.0,
            },
            steering: Steering::Velocity,
            alert: None,
            collider: None,
            body: BodyConfig::default(),
            color: default_color(),
        }
    }

    /// Path-following tracker with a view cone that alerts its neighbours.
    pub fn hunter() -> Self {
        Self {
            name: "Hunter".to_string(),
            speed: 2.0,
            detection_radius: 15.0,
            field_of_view: Some(FRAC_PI_4),
            patrol_radius: 20.0,
            patrol_factor: 0.5,
            reaction_delay: 0.1,
            pursuit: Pursuit::PathFollow {
                repath_distance: 1.5,
                retry_delay: 1.0,
            },
            steering: Steering::Force { magnitude: 10.0 },
            alert: Some(Alert {
                radius: 10.0,
                hold: 3.0,
            }),
            collider: None,
            // Frictionless, with damping that caps the top speed at
            // magnitude / (mass * damping) = speed.
            body: BodyConfig {
                friction: 0.0,
                linear_damping: 5.0,
                angular_damping: 0.5,
                ..default()
            },
            color: (0.5, 0.1, 0.7),
        }
    }

    /// Validate into runtime tuning. `archetype` names the definition in
    /// errors.
    pub fn to_tuning(&self, archetype: &str) -> Result<EnemyTuning, EnemyConfigError> {
        let check = Check { archetype };

        let fov_half_angle = match self.field_of_view {
            Some(angle) if !(angle.is_finite() && angle > 0.0 && angle <= PI) => {
                return Err(EnemyConfigError::FieldOfView {
                    archetype: archetype.to_string(),
                    value: angle,
                });
            }
            other => other,
        };

        let pursuit = match self.pursuit {
            Pursuit::Orbit { radius, angular_speed } => Pursuit::Orbit {
                radius: check.positive("orbit radius", radius)?,
                angular_speed: check.positive("orbit angular speed", angular_speed)?,
            },
            Pursuit::PathFollow {
                repath_distance,
                retry_delay,
            } => Pursuit::PathFollow {
                repath_distance: check.positive("repath distance", repath_distance)?,
                retry_delay: check.non_negative("retry delay", retry_delay)?,
            },
        };

        let steering = match self.steering {
            Steering::Velocity => Steering::Velocity,
            Steering::Force { magnitude } => Steering::Force {
                magnitude: check.positive("steering force", magnitude)?,
            },
        };

        let alert = match self.alert {
            Some(alert) => Some(Alert {
                radius: check.positive("alert radius", alert.radius)?,
                hold: check.non_negative("alert hold", alert.hold)?,
            }),
            None => None,
        };

        let patrol_factor = check.positive("patrol factor", self.patrol_factor)?;
        let collider = self.collider.clone().unwrap_or_default();
        let body = BodyTuning {
            shape: BodyShape::Cylinder {
                half_height: check.positive("collider half height", collider.half_height)?,
                radius: check.positive("collider radius", collider.radius)?,
            },
            mass: check.positive("mass", self.body.mass)?,
            friction: check.non_negative("friction", self.body.friction)?,
            restitution: check.non_negative("restitution", self.body.restitution)?,
            linear_damping: check.non_negative("linear damping", self.body.linear_damping)?,
            angular_damping: check.non_negative("angular damping", self.body.angular_damping)?,
        };

        if let Steering::Force { magnitude } = steering {
            check.positive("linear damping", body.linear_damping)?;
            let drive = magnitude * patrol_factor;
            let grip = body.friction * body.mass * GRAVITY;
            if drive <= grip {
                return Err(EnemyConfigError::WeakDrive {
                    archetype: archetype.to_string(),
                    drive,
                    grip,
                });
            }
        }

        Ok(EnemyTuning {
            archetype: archetype.to_string(),
            speed: check.positive("speed", self.speed)?,
            detection_radius: check.positive("detection radius", self.detection_radius)?,
            fov_half_angle,
            patrol_radius: check.non_negative("patrol radius", self.patrol_radius)?,
            patrol_factor,
            reaction_delay: check.non_negative("reaction delay", self.reaction_delay)?,
            pursuit,
            steering,
            alert,
            body,
            color: Color::srgb(self.color.0, self.color.1, self.color.2),
        })
    }
}

struct Check<'a> {
    archetype: &'a str,
}

impl Check<'_> {
    fn positive(&self, field: &'static str, value: f32) -> Result<f32, EnemyConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(EnemyConfigError::NonPositive {
                archetype: self.archetype.to_string(),
                field,
                value,
            })
        }
    }

    fn non_negative(&self, field: &'static str, value: f32) -> Result<f32, EnemyConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(EnemyConfigError::Negative {
                archetype: self.archetype.to_string(),
                field,
                value,
            })
        }
    }
}

/// Parse a definition from RON source. `origin` names the source in errors.
pub fn parse_definition(source: &str, origin: &str) -> Result<EnemyDefinition, DataLoadError> {
    ron::from_str(source).map_err(|e| DataLoadError::ParseError {
        path: origin.to_string(),
        details: e.to_string(),
    })
}

fn read_definition(path: &Path) -> Result<EnemyDefinition, DataLoadError> {
    let origin = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: origin.clone(),
        details: e.to_string(),
    })?;
    parse_definition(&contents, &origin)
}

/// Resource holding every validated enemy archetype.
#[derive(Resource, Default)]
pub struct EnemyRegistry {
    archetypes: HashMap<String, EnemyTuning>,
}

impl EnemyRegistry {
    /// Registry with the sentinel and hunter archetypes.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.insert_builtins();
        registry
    }

    /// Get an archetype by type name.
    pub fn get(&self, archetype: &str) -> Option<&EnemyTuning> {
        self.archetypes.get(archetype)
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Validate and register a definition under `archetype`.
    pub fn register(&mut self, archetype: &str, definition: &EnemyDefinition) -> Result<(), EnemyConfigError> {
        let tuning = definition.to_tuning(archetype)?;
        self.archetypes.insert(archetype.to_string(), tuning);
        Ok(())
    }

    fn insert_builtins(&mut self) {
        let builtins = [("sentinel", EnemyDefinition::sentinel()), ("hunter", EnemyDefinition::hunter())];
        for (archetype, definition) in builtins {
            if let Err(e) = self.register(archetype, &definition) {
                error!("Built-in enemy archetype rejected: {}", e);
            }
        }
    }

    /// Load every `*.ron` file in `dir`, keyed by file stem. Returns how many
    /// archetypes were registered.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        if !dir.exists() {
            warn!("Enemy definitions directory not found: {:?}", dir);
            return 0;
        }

        let Ok(entries) = fs::read_dir(dir) else {
            warn!("Failed to read enemy definitions directory");
            return 0;
        };

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "ron") {
                continue;
            }
            let Some(archetype) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let definition = match read_definition(&path) {
                Ok(definition) => definition,
                Err(e) => {
                    error!("{}", e);
                    continue;
                }
            };
            match self.register(archetype, &definition) {
                Ok(()) => {
                    info!("Loaded enemy definition: {} ({})", definition.name, archetype);
                    loaded += 1;
                }
                Err(e) => error!("Rejected enemy definition {:?}: {}", path, e),
            }
        }
        loaded
    }
}

/// Load archetypes from disk, falling back to the built-in ones.
pub fn load_enemy_definitions(mut registry: ResMut<EnemyRegistry>) {
    if registry.load_dir(Path::new(ENEMY_DATA_DIR)) == 0 {
        warn!("No enemy definitions loaded, using built-in archetypes");
        registry.insert_builtins();
    }

    info!("Loaded {} enemy definitions", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn builtins_validate() {
        let registry = EnemyRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("sentinel").unwrap().steering, Steering::Velocity);
        assert!(registry.get("hunter").unwrap().pursuit.needs_navigation());
    }

    #[test]
    fn shipped_files_match_builtins() {
        let sentinel = parse_definition(include_str!("../../assets/data/enemies/sentinel.ron"), "sentinel.ron")
            .unwrap()
            .to_tuning("sentinel")
            .unwrap();
        let hunter = parse_definition(include_str!("../../assets/data/enemies/hunter.ron"), "hunter.ron")
            .unwrap()
            .to_tuning("hunter")
            .unwrap();

        assert_eq!(sentinel, EnemyDefinition::sentinel().to_tuning("sentinel").unwrap());
        let builtin_hunter = EnemyDefinition::hunter().to_tuning("hunter").unwrap();
        assert_eq!(hunter.pursuit, builtin_hunter.pursuit);
        assert_eq!(hunter.steering, builtin_hunter.steering);
        assert_eq!(hunter.body, builtin_hunter.body);
        assert_relative_eq!(hunter.fov_half_angle.unwrap(), FRAC_PI_4, epsilon = 1e-4);
    }

    #[test]
    fn minimal_definition_fills_defaults() {
        let source = r#"(
            name: "Scout",
            speed: 1.5,
            detection_radius: 8.0,
            patrol_radius: 4.0,
            pursuit: Orbit(radius: 1.0, angular_speed: 2.0),
            steering: Velocity,
        )"#;

        let tuning = parse_definition(source, "scout.ron").unwrap().to_tuning("scout").unwrap();

        assert_relative_eq!(tuning.patrol_factor, 0.5);
        assert_relative_eq!(tuning.body.mass, 1.0);
        assert!(tuning.alert.is_none());
        assert!(tuning.fov_half_angle.is_none());
    }

    #[test]
    fn malformed_source_reports_origin() {
        let err = parse_definition("(name: 3)", "broken.ron").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { ref path, .. } if path == "broken.ron"));
    }

    #[rstest]
    #[case::zero_speed(|d: &mut EnemyDefinition| d.speed = 0.0, "speed")]
    #[case::negative_radius(|d: &mut EnemyDefinition| d.detection_radius = -1.0, "detection radius")]
    #[case::nan_patrol_factor(|d: &mut EnemyDefinition| d.patrol_factor = f32::NAN, "patrol factor")]
    #[case::zero_orbit(|d: &mut EnemyDefinition| d.pursuit = Pursuit::Orbit { radius: 0.0, angular_speed: 1.0 }, "orbit radius")]
    #[case::zero_force(|d: &mut EnemyDefinition| d.steering = Steering::Force { magnitude: 0.0 }, "steering force")]
    #[case::zero_mass(|d: &mut EnemyDefinition| d.body.mass = 0.0, "mass")]
    fn non_positive_values_are_rejected(#[case] corrupt: fn(&mut EnemyDefinition), #[case] field: &str) {
        let mut definition = EnemyDefinition::sentinel();
        corrupt(&mut definition);

        match definition.to_tuning("sentinel") {
            Err(EnemyConfigError::NonPositive { field: rejected, .. }) => assert_eq!(rejected, field),
            other => panic!("expected rejection of {field}, got {other:?}"),
        }
    }

    #[test]
    fn negative_delay_is_rejected() {
        let mut definition = EnemyDefinition::hunter();
        definition.reaction_delay = -0.1;

        assert!(matches!(
            definition.to_tuning("hunter"),
            Err(EnemyConfigError::Negative { field: "reaction delay", .. })
        ));
    }

    #[test]
    fn hunter_tops_out_at_its_speed() {
        let tuning = EnemyDefinition::hunter().to_tuning("hunter").unwrap();
        let Steering::Force { magnitude } = tuning.steering else {
            panic!("hunters steer by force");
        };

        let top_speed = magnitude / (tuning.body.mass * tuning.body.linear_damping);
        assert_relative_eq!(top_speed, tuning.speed);
    }

    #[test]
    fn patrol_force_must_beat_friction() {
        let mut definition = EnemyDefinition::hunter();
        // 10 N * 0.5 against 0.8 * 1 kg * 9.81 m/s^2.
        definition.body.friction = 0.8;

        assert!(matches!(
            definition.to_tuning("hunter"),
            Err(EnemyConfigError::WeakDrive { drive, .. }) if drive == 5.0
        ));
    }

    #[test]
    fn force_steering_needs_damping() {
        let mut definition = EnemyDefinition::hunter();
        definition.body.linear_damping = 0.0;

        assert!(matches!(
            definition.to_tuning("hunter"),
            Err(EnemyConfigError::NonPositive { field: "linear damping", .. })
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(4.0)]
    fn out_of_range_fov_is_rejected(#[case] angle: f32) {
        let mut definition = EnemyDefinition::hunter();
        definition.field_of_view = Some(angle);

        assert!(matches!(definition.to_tuning("hunter"), Err(EnemyConfigError::FieldOfView { .. })));
    }

    #[test]
    fn load_dir_skips_invalid_files() {
        let dir = std::env::temp_dir().join(format!("village-patrol-enemies-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("lurker.ron"),
            r#"(name: "Lurker", speed: 1.0, detection_radius: 5.0, patrol_radius: 2.0,
                pursuit: Orbit(radius: 1.0, angular_speed: 1.0), steering: Velocity)"#,
        )
        .unwrap();
        fs::write(
            dir.join("statue.ron"),
            r#"(name: "Statue", speed: 0.0, detection_radius: 5.0, patrol_radius: 2.0,
                pursuit: Orbit(radius: 1.0, angular_speed: 1.0), steering: Velocity)"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "not a definition").unwrap();

        let mut registry = EnemyRegistry::default();
        let loaded = registry.load_dir(&dir);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded, 1);
        assert!(registry.get("lurker").is_some());
        assert!(registry.get("statue").is_none());
    }

    #[test]
    fn missing_dir_loads_nothing() {
        let mut registry = EnemyRegistry::default();
        assert_eq!(registry.load_dir(Path::new("does/not/exist")), 0);
        assert!(registry.is_empty());
    }
}
