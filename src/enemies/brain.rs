//! Enemy behaviour state machine.
//!
//! [`EnemyBrain::tick`] is a plain function of the agent's own state, what it
//! senses this tick and the navigation layer. It never touches the ECS; the
//! systems in `ai` feed it and apply the returned [`Thought`] to the body.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use super::perception::{detect, planar, planar_distance};
use super::tuning::{Alert, EnemyTuning, Pursuit, Steering};
use crate::navigation::NavigationService;
use crate::physics::PhysicsBody;

/// Planar distance at which a patrol or return target counts as reached.
pub const ARRIVAL_RADIUS: f32 = 0.5;

/// Planar distance at which a path waypoint counts as reached.
pub const WAYPOINT_RADIUS: f32 = 0.3;

/// Seconds a patroller is given beyond twice the nominal travel time before
/// it gives up on a patrol point.
const PATROL_GRACE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    #[default]
    Patrolling,
    Chasing,
    Returning,
}

/// Where the agent is currently heading.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NavTarget {
    #[default]
    None,
    Point(Vec3),
    Path { waypoints: Vec<Vec3>, cursor: usize },
}

impl NavTarget {
    /// The point currently steered toward, if any.
    pub fn aim(&self) -> Option<Vec3> {
        match self {
            NavTarget::None => None,
            NavTarget::Point(point) => Some(*point),
            NavTarget::Path { waypoints, cursor } => waypoints.get(*cursor).copied(),
        }
    }

    /// Waypoints not yet reached.
    pub fn remaining(&self) -> &[Vec3] {
        match self {
            NavTarget::Path { waypoints, cursor } => waypoints.get(*cursor..).unwrap_or_default(),
            _ => &[],
        }
    }
}

/// Planar steering intent in (x, z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steer {
    Velocity(Vec2),
    Force(Vec2),
}

impl Steer {
    pub fn apply(self, body: &mut impl PhysicsBody) {
        match self {
            Steer::Velocity(v) => body.set_planar_velocity(v.x, v.y),
            Steer::Force(f) => body.apply_force(f.x, f.y),
        }
    }

    pub fn vector(self) -> Vec2 {
        match self {
            Steer::Velocity(v) | Steer::Force(v) => v,
        }
    }
}

/// What the agent perceives this tick.
#[derive(Debug, Clone, Copy)]
pub struct Senses {
    /// Player position, `None` when there is no living player.
    pub player: Option<Vec3>,
    /// Seconds since the simulation started.
    pub elapsed: f32,
    pub dt: f32,
    /// Orbit phase from the roster slot.
    pub phase_offset: f32,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thought {
    pub steer: Steer,
    /// The agent spotted the player itself and should alert its neighbours.
    pub raised_alarm: bool,
    pub previous: EnemyState,
}

/// Point on the orbit ring of `radius` around `center` at `angle`.
pub fn orbit_target(center: Vec3, radius: f32, angle: f32) -> Vec3 {
    center + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

#[derive(Component, Debug, Clone)]
pub struct EnemyBrain {
    state: EnemyState,
    target: NavTarget,
    spawn: Vec3,
    position: Vec3,
    forward: Vec3,
    reaction_timer: f32,
    alarm_hold: f32,
    nav_backoff: f32,
    patrol_budget: f32,
}

impl EnemyBrain {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            state: EnemyState::Patrolling,
            target: NavTarget::None,
            spawn,
            position: spawn,
            forward: Vec3::Z,
            reaction_timer: 0.0,
            alarm_hold: 0.0,
            nav_backoff: 0.0,
            patrol_budget: 0.0,
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn target(&self) -> &NavTarget {
        &self.target
    }

    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit planar direction of the last non-zero steering intent.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Mirror the body's position after a world step.
    pub fn sync_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// React to a neighbour's alarm raised at `origin`. Returns whether this
    /// agent was roused.
    pub fn hear_alarm(&mut self, origin: Vec3, alert: &Alert) -> bool {
        if self.state == EnemyState::Chasing || self.position.distance(origin) > alert.radius {
            return false;
        }
        self.enter(EnemyState::Chasing);
        self.alarm_hold = alert.hold;
        true
    }

    /// Advance one fixed tick: transition, then pick a steering intent.
    pub fn tick<N, R>(&mut self, tuning: &EnemyTuning, senses: &Senses, nav: &N, rng: &mut R) -> Thought
    where
        N: NavigationService + ?Sized,
        R: Rng,
    {
        let previous = self.state;
        self.alarm_hold = (self.alarm_hold - senses.dt).max(0.0);
        self.nav_backoff = (self.nav_backoff - senses.dt).max(0.0);

        let spotted = self.transition(tuning, senses);
        let (direction, speed_fraction) = self.act(tuning, senses, nav, rng);

        if direction != Vec2::ZERO {
            self.forward = Vec3::new(direction.x, 0.0, direction.y);
        }

        let steer = match tuning.steering {
            Steering::Velocity => Steer::Velocity(direction * tuning.speed * speed_fraction),
            Steering::Force { magnitude } => Steer::Force(direction * magnitude * speed_fraction),
        };

        Thought {
            steer,
            raised_alarm: spotted && tuning.alert.is_some() && self.state == EnemyState::Chasing,
            previous,
        }
    }

    /// Apply this tick's state transition. Returns whether the player was
    /// spotted by this agent's own senses.
    fn transition(&mut self, tuning: &EnemyTuning, senses: &Senses) -> bool {
        match self.state {
            EnemyState::Patrolling => self.try_acquire(tuning, senses),
            EnemyState::Chasing => {
                let in_range = senses
                    .player
                    .is_some_and(|player| self.position.distance(player) <= tuning.detection_radius);
                if !in_range && self.alarm_hold <= 0.0 {
                    self.enter(EnemyState::Returning);
                }
                false
            }
            EnemyState::Returning => {
                if planar_distance(self.position, self.spawn) < ARRIVAL_RADIUS {
                    self.enter(EnemyState::Patrolling);
                    false
                } else {
                    self.try_acquire(tuning, senses)
                }
            }
        }
    }

    fn try_acquire(&mut self, tuning: &EnemyTuning, senses: &Senses) -> bool {
        if self.nav_backoff > 0.0 {
            return false;
        }
        let seen = senses.player.is_some_and(|player| {
            detect(
                self.position,
                self.forward,
                player,
                tuning.detection_radius,
                tuning.fov_half_angle,
            )
        });
        if !seen {
            self.reaction_timer = 0.0;
            return false;
        }

        self.reaction_timer += senses.dt;
        if self.reaction_timer < tuning.reaction_delay {
            return false;
        }
        self.enter(EnemyState::Chasing);
        true
    }

    /// Per-state action. Returns the unit planar steering direction and the
    /// fraction of full speed to move at.
    fn act<N, R>(&mut self, tuning: &EnemyTuning, senses: &Senses, nav: &N, rng: &mut R) -> (Vec2, f32)
    where
        N: NavigationService + ?Sized,
        R: Rng,
    {
        match self.state {
            EnemyState::Patrolling => self.patrol(tuning, senses.dt, nav, rng),
            EnemyState::Returning => {
                self.target = NavTarget::Point(self.spawn);
                (self.heading(), 1.0)
            }
            EnemyState::Chasing => {
                let Some(player) = senses.player else {
                    return (Vec2::ZERO, 0.0);
                };
                match tuning.pursuit {
                    Pursuit::Orbit { radius, angular_speed } => {
                        let angle = senses.elapsed * angular_speed + senses.phase_offset;
                        self.target = NavTarget::Point(orbit_target(player, radius, angle));
                        (self.heading(), 1.0)
                    }
                    Pursuit::PathFollow {
                        repath_distance,
                        retry_delay,
                    } => {
                        if self.needs_repath(player, repath_distance) {
                            let waypoints = nav.find_path(self.position, player);
                            if waypoints.is_empty() {
                                debug!(
                                    "{} lost its path to the player, resuming patrol",
                                    tuning.archetype
                                );
                                self.nav_backoff = retry_delay;
                                self.enter(EnemyState::Patrolling);
                                return self.patrol(tuning, senses.dt, nav, rng);
                            }
                            let cursor = usize::from(waypoints.len() > 1);
                            self.target = NavTarget::Path { waypoints, cursor };
                        }
                        self.advance_waypoints();
                        (self.heading(), 1.0)
                    }
                }
            }
        }
    }

    /// Walk toward the patrol point, drawing a new one on arrival or once
    /// the budget for the current one runs out.
    fn patrol<N, R>(&mut self, tuning: &EnemyTuning, dt: f32, nav: &N, rng: &mut R) -> (Vec2, f32)
    where
        N: NavigationService + ?Sized,
        R: Rng,
    {
        self.patrol_budget -= dt;
        let reached = self
            .target
            .aim()
            .map_or(true, |aim| planar_distance(self.position, aim) < ARRIVAL_RADIUS);
        if reached || self.patrol_budget <= 0.0 {
            let point = self.patrol_point(tuning, nav, rng);
            let travel = planar_distance(self.position, point) / (tuning.speed * tuning.patrol_factor);
            self.patrol_budget = 2.0 * travel + PATROL_GRACE;
            self.target = NavTarget::Point(point);
        }
        (self.heading(), tuning.patrol_factor)
    }

    /// Random walkable point within the patrol radius of spawn. Stays put
    /// when the navigation layer has nowhere to stand.
    fn patrol_point<N, R>(&self, tuning: &EnemyTuning, nav: &N, rng: &mut R) -> Vec3
    where
        N: NavigationService + ?Sized,
        R: Rng,
    {
        let angle = rng.gen_range(0.0..TAU);
        let distance = if tuning.patrol_radius > 0.0 {
            rng.gen_range(0.0..tuning.patrol_radius)
        } else {
            0.0
        };
        let candidate = self.spawn + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);
        nav.walkable_point(candidate).unwrap_or(self.position)
    }

    fn needs_repath(&self, player: Vec3, repath_distance: f32) -> bool {
        match &self.target {
            NavTarget::Path { waypoints, cursor } => {
                *cursor >= waypoints.len()
                    || waypoints
                        .last()
                        .map_or(true, |end| planar_distance(*end, player) > repath_distance)
            }
            _ => true,
        }
    }

    fn advance_waypoints(&mut self) {
        if let NavTarget::Path { waypoints, cursor } = &mut self.target {
            while waypoints
                .get(*cursor)
                .is_some_and(|waypoint| planar_distance(self.position, *waypoint) < WAYPOINT_RADIUS)
            {
                *cursor += 1;
            }
        }
    }

    fn heading(&self) -> Vec2 {
        self.target
            .aim()
            .map_or(Vec2::ZERO, |aim| planar(aim - self.position).normalize_or_zero())
    }

    fn enter(&mut self, state: EnemyState) {
        self.state = state;
        self.target = NavTarget::None;
        self.reaction_timer = 0.0;
        self.patrol_budget = 0.0;
    }
}
