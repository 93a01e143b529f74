//! Enemy population - ordered roster, phase spacing and deferred removal.

use std::f32::consts::TAU;

use bevy::prelude::*;

/// Request to spawn one enemy of `archetype` at `position`.
#[derive(Event, Debug, Clone)]
pub struct SpawnEnemy {
    pub archetype: String,
    pub position: Vec3,
}

/// Request to remove an enemy at the end of the tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct DismissEnemy(pub Entity);

/// Orbit phase of roster slot `index` out of `total`.
pub fn phase_offset(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    TAU * index as f32 / total as f32
}

/// An enemy's place in the roster.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RosterSlot {
    pub index: usize,
    pub phase_offset: f32,
}

/// Ordered list of live enemies. Enemies update in this order every tick.
#[derive(Resource, Debug, Default)]
pub struct EnemyRoster {
    members: Vec<Entity>,
    pending: Vec<Entity>,
    changed: bool,
}

impl EnemyRoster {
    /// Append an enemy and return its index. Enlisting twice is a no-op.
    pub fn enlist(&mut self, entity: Entity) -> usize {
        if let Some(index) = self.index_of(entity) {
            return index;
        }
        self.members.push(entity);
        self.changed = true;
        self.members.len() - 1
    }

    /// Mark an enemy for removal at the next commit. Returns `false` if it
    /// is not enlisted.
    pub fn dismiss(&mut self, entity: Entity) -> bool {
        if !self.members.contains(&entity) {
            return false;
        }
        if !self.pending.contains(&entity) {
            self.pending.push(entity);
        }
        true
    }

    /// Mark every enemy for removal.
    pub fn dismiss_all(&mut self) {
        for index in 0..self.members.len() {
            let entity = self.members[index];
            self.dismiss(entity);
        }
    }

    /// Apply pending removals. Returns the removed enemies, or `None` if
    /// membership has not changed since the last commit.
    pub fn commit(&mut self) -> Option<Vec<Entity>> {
        let removed = std::mem::take(&mut self.pending);
        if removed.is_empty() && !self.changed {
            return None;
        }
        self.members.retain(|member| !removed.contains(member));
        self.changed = false;
        Some(removed)
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.members.iter().position(|member| *member == entity)
    }

    pub fn is_pending(&self, entity: Entity) -> bool {
        self.pending.contains(&entity)
    }

    /// Slot for `index` under the current membership.
    pub fn slot(&self, index: usize) -> RosterSlot {
        RosterSlot {
            index,
            phase_offset: phase_offset(index, self.members.len()),
        }
    }
}

/// Queue dismissals requested this tick.
pub fn queue_dismissals(mut requests: EventReader<DismissEnemy>, mut roster: ResMut<EnemyRoster>) {
    for DismissEnemy(entity) in requests.read() {
        if !roster.dismiss(*entity) {
            warn!("Ignoring dismissal of {:?}: not an enlisted enemy", entity);
        }
    }
}

/// Despawn dismissed enemies and respace the survivors.
pub fn commit_roster(
    mut commands: Commands,
    mut roster: ResMut<EnemyRoster>,
    mut slots: Query<&mut RosterSlot>,
) {
    let Some(removed) = roster.commit() else {
        return;
    };

    for entity in &removed {
        if let Some(entity_commands) = commands.get_entity(*entity) {
            entity_commands.despawn_recursive();
        }
    }

    for (index, entity) in roster.members().iter().enumerate() {
        if let Ok(mut slot) = slots.get_mut(*entity) {
            *slot = roster.slot(index);
        }
    }

    if !removed.is_empty() {
        debug!("Roster committed: {} removed, {} remain", removed.len(), roster.len());
    }
}

/// Dismiss and despawn every enemy when leaving the game.
pub fn disband_roster(mut commands: Commands, mut roster: ResMut<EnemyRoster>) {
    roster.dismiss_all();
    let removed = roster.commit().unwrap_or_default();
    for entity in &removed {
        if let Some(entity_commands) = commands.get_entity(*entity) {
            entity_commands.despawn_recursive();
        }
    }
    info!("Disbanded {} enemies", removed.len());
}
