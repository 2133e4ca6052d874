//! Target representation shared by the scanner, validator, and planner.

use bevy::prelude::*;

use crate::arena::TeamId;

/// What kind of thing an agent is currently pursuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetKind {
    #[default]
    None,
    Item,
    Character,
    Waypoint,
    Checkpoint,
}

/// The two scan tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Near,
    Distance,
}

/// A target handle with its kind, resolved once when the target is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldTarget {
    pub entity: Entity,
    pub kind: TargetKind,
}

/// Kind-specific state of a potential target, as seen this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetBody {
    Item {
        picked_up: bool,
        reserved_by: Option<Entity>,
    },
    Character {
        alive: bool,
        team: Option<TeamId>,
    },
    /// Route order is carried by [`WorldContext::section_waypoints`].
    ///
    /// [`WorldContext::section_waypoints`]: super::world::WorldContext::section_waypoints
    Waypoint,
    Checkpoint {
        owner: Option<TeamId>,
    },
}

impl TargetBody {
    pub fn kind(&self) -> TargetKind {
        match self {
            TargetBody::Item { .. } => TargetKind::Item,
            TargetBody::Character { .. } => TargetKind::Character,
            TargetBody::Waypoint => TargetKind::Waypoint,
            TargetBody::Checkpoint { .. } => TargetKind::Checkpoint,
        }
    }
}

/// Snapshot of a potential target. Absence means the entity is gone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub position: Vec3,
    pub body: TargetBody,
}
