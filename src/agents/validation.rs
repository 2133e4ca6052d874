//! Target eligibility rules.
//!
//! Everything here is a pure function of the agent's identity, its position,
//! the tuning constants, and the world snapshot.

use bevy::prelude::*;

use super::brain::Agent;
use super::target::{HeldTarget, TargetBody, TargetInfo, TargetKind, Tier};
use super::world::WorldContext;
use crate::arena::TeamId;
use crate::core::AgentTuning;

/// Why a held target stopped being worth pursuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    Destroyed,
    Died,
    OutOfRange,
    FollowTimeout,
    PickedUp,
    ReservedElsewhere,
    CheckpointFriendly,
}

/// Verdict on the target an agent is currently pursuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Valid,
    /// A valid near target appeared while pursuing a map objective.
    Preempted,
    Lost(LossReason),
}

impl TargetStatus {
    pub fn is_valid(self) -> bool {
        self == TargetStatus::Valid
    }
}

/// Eligibility checks from the point of view of one agent.
pub struct TargetValidator<'a> {
    pub agent: Entity,
    pub team: TeamId,
    pub position: Vec3,
    pub tuning: &'a AgentTuning,
    pub world: &'a dyn WorldContext,
}

impl<'a> TargetValidator<'a> {
    pub fn new(
        agent: Entity,
        team: TeamId,
        position: Vec3,
        tuning: &'a AgentTuning,
        world: &'a dyn WorldContext,
    ) -> Self {
        Self {
            agent,
            team,
            position,
            tuning,
            world,
        }
    }

    /// Whether `candidate` may become (or remain) the agent's near target.
    pub fn is_valid_near_target(&self, candidate: Option<Entity>) -> bool {
        let Some(entity) = candidate else {
            return false;
        };
        if entity == self.agent {
            return false;
        }
        let Some(info) = self.world.target(entity) else {
            return false;
        };
        if self.out_of_range(&info) {
            return false;
        }

        match info.body {
            TargetBody::Item {
                picked_up,
                reserved_by,
            } => {
                !picked_up
                    && reserved_by.map_or(true, |owner| owner == self.agent)
                    && (self.team != self.tuning.mob_team || self.tuning.special_mode)
            }
            TargetBody::Character { alive, team, .. } => {
                alive && team.is_some_and(|team| team != self.team)
            }
            TargetBody::Waypoint | TargetBody::Checkpoint { .. } => false,
        }
    }

    /// Whether `candidate` is a map objective worth travelling to.
    pub fn is_valid_distance_target(&self, candidate: Option<Entity>) -> bool {
        let Some(info) = candidate.and_then(|entity| self.world.target(entity)) else {
            return false;
        };

        match info.body {
            TargetBody::Checkpoint { owner, .. } => owner != Some(self.team),
            TargetBody::Waypoint => true,
            TargetBody::Item { .. } | TargetBody::Character { .. } => false,
        }
    }

    /// Re-check the target `agent` is currently pursuing.
    ///
    /// Returns `None` when the agent is not pursuing anything.
    pub fn current_target_status(&self, agent: &Agent) -> Option<TargetStatus> {
        let tier = agent.current_tier()?;
        let held = agent.current_target()?;

        let Some(info) = self.world.target(held.entity) else {
            return Some(TargetStatus::Lost(LossReason::Destroyed));
        };

        let status = match tier {
            Tier::Near => self.near_status(held, &info, agent.follow_time()),
            Tier::Distance => self.distance_status(&info, agent.near_target()),
        };
        Some(status)
    }

    /// True when the agent has a current target and it is still worth pursuing.
    pub fn is_current_target_still_valid(&self, agent: &Agent) -> bool {
        self.current_target_status(agent)
            .is_some_and(TargetStatus::is_valid)
    }

    /// Kind of `entity`, if it still exists.
    pub fn kind_of(&self, entity: Entity) -> TargetKind {
        self.world
            .target(entity)
            .map_or(TargetKind::None, |info| info.body.kind())
    }

    fn near_status(&self, held: HeldTarget, info: &TargetInfo, follow_time: f32) -> TargetStatus {
        match info.body {
            TargetBody::Character { alive, .. } => {
                if !alive {
                    TargetStatus::Lost(LossReason::Died)
                } else if self.out_of_range(info) {
                    TargetStatus::Lost(LossReason::OutOfRange)
                } else if follow_time > self.tuning.max_follow_time {
                    TargetStatus::Lost(LossReason::FollowTimeout)
                } else {
                    TargetStatus::Valid
                }
            }
            TargetBody::Item {
                picked_up,
                reserved_by,
            } => {
                if picked_up {
                    TargetStatus::Lost(LossReason::PickedUp)
                } else if reserved_by.is_some_and(|owner| owner != self.agent) {
                    TargetStatus::Lost(LossReason::ReservedElsewhere)
                } else {
                    TargetStatus::Valid
                }
            }
            // A handle that resolved to a near kind at acquisition can't change
            // kind; treat it as gone.
            TargetBody::Waypoint | TargetBody::Checkpoint { .. } => {
                debug!("Near target {:?} is no longer a near kind", held.entity);
                TargetStatus::Lost(LossReason::Destroyed)
            }
        }
    }

    fn distance_status(&self, info: &TargetInfo, near: Option<HeldTarget>) -> TargetStatus {
        if let TargetBody::Checkpoint { owner, .. } = info.body {
            if owner == Some(self.team) {
                return TargetStatus::Lost(LossReason::CheckpointFriendly);
            }
        }

        if self.is_valid_near_target(near.map(|held| held.entity)) {
            return TargetStatus::Preempted;
        }

        TargetStatus::Valid
    }

    fn out_of_range(&self, info: &TargetInfo) -> bool {
        info.position.distance(self.position) > self.tuning.inactive_range
    }
}
