//! Arena entity components: teams, pickups, and map objectives.

use bevy::prelude::*;
use serde::Deserialize;

/// Team affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    /// Conventional id of the neutral mob team.
    pub const MOBS: TeamId = TeamId(255);
}

/// Team membership of a character. Characters without one cannot run AI.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team(pub TeamId);

/// Level section identifier. Waypoints are ordered per section.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SectionId(pub u32);

/// Which map objectives the distance tier pursues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GameMode {
    /// Walk the current section's waypoints in order.
    #[default]
    Waypoints,
    /// Capture checkpoints not yet held by the team.
    Checkpoints,
}

/// Item lying in the arena.
#[derive(Component, Debug, Clone, Default)]
pub struct Pickup {
    pub picked_up: bool,
    /// Agent that claimed this item as its target.
    pub reserved_by: Option<Entity>,
    /// Whether the item can be used once held.
    pub usable: bool,
}

/// Item currently carried by a character.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HeldItem {
    pub item: Option<Entity>,
    pub usable: bool,
}

/// How far along its section's waypoint route a character has come.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteProgress {
    /// Index of the waypoint the character is heading to.
    pub next_waypoint: u32,
}

/// Capturable map objective.
#[derive(Component, Debug, Clone, Default)]
pub struct Checkpoint {
    /// Position in the global checkpoint list.
    pub order: u32,
    pub owner: Option<TeamId>,
    /// Team currently holding the capture zone.
    pub contested_by: Option<TeamId>,
    /// Seconds `contested_by` has held it.
    pub progress: f32,
}

impl Checkpoint {
    pub fn new(order: u32) -> Self {
        Self {
            order,
            ..default()
        }
    }

    pub fn is_friendly_to(&self, team: TeamId) -> bool {
        self.owner == Some(team)
    }

    /// Credit `team` with `dt` seconds in the capture zone.
    ///
    /// Returns `true` when this flips ownership to `team`.
    pub fn advance_capture(&mut self, team: TeamId, dt: f32, capture_time: f32) -> bool {
        if self.is_friendly_to(team) {
            return false;
        }

        if self.contested_by == Some(team) {
            self.progress += dt;
        } else {
            self.contested_by = Some(team);
            self.progress = dt;
        }

        if self.progress < capture_time {
            return false;
        }

        self.owner = Some(team);
        self.contested_by = None;
        self.progress = 0.0;
        true
    }

    /// Nobody held the zone this frame.
    pub fn abandon_capture(&mut self) {
        self.contested_by = None;
        self.progress = 0.0;
    }
}

/// Ordered navigation marker within a section.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waypoint {
    pub section: SectionId,
    pub order: u32,
}
