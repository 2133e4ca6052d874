//! Read-only view of the arena that agent brains decide against.

use bevy::prelude::*;

use super::target::TargetInfo;
use crate::arena::SectionId;

/// Result of one path-following step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathStep {
    /// Desired velocity this frame.
    pub velocity: Vec3,
    /// Within the stand-off distance of the goal.
    pub arrived: bool,
}

/// Per-frame state of the agent's own character.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentBody {
    pub position: Vec3,
    pub grounded: bool,
    /// Locked in an attack; no new action may start.
    pub attacking: bool,
    pub holds_usable_item: bool,
}

/// Arena queries an agent needs, implemented by the host.
///
/// Implementations must not change between calls within one frame.
pub trait WorldContext {
    /// Current state of `entity`, or `None` if it no longer exists.
    fn target(&self, entity: Entity) -> Option<TargetInfo>;

    /// All entities whose colliders overlap the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity>;

    /// Every checkpoint, in global order.
    fn checkpoints(&self) -> Vec<Entity>;

    /// Waypoints of `section`, in traversal order.
    fn section_waypoints(&self, section: SectionId) -> Vec<Entity>;

    /// Advance from `from` toward `to`, stopping `stand_off` short.
    fn path_step(&self, from: Vec3, to: Vec3, stand_off: f32, speed: f32) -> PathStep {
        steer_straight(from, to, stand_off, speed)
    }
}

/// Straight-line steering on the horizontal plane.
pub fn steer_straight(from: Vec3, to: Vec3, stand_off: f32, speed: f32) -> PathStep {
    let offset = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let distance = offset.length();

    if distance <= stand_off {
        return PathStep {
            velocity: Vec3::ZERO,
            arrived: true,
        };
    }

    PathStep {
        velocity: offset / distance * speed,
        arrived: false,
    }
}
