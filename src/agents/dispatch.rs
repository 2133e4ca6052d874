//! Turns "target reached" into a discrete action.

use bevy::prelude::Entity;

use super::target::{HeldTarget, TargetKind};
use crate::core::ActorAction;

/// Outcome of dispatch for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Publish this action.
    Act(ActorAction),
    /// The agent stands on its waypoint; the planner advances the route.
    ReachedWaypoint(Entity),
}

/// What the dispatcher sees for one agent in one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchContext {
    pub target: Option<HeldTarget>,
    pub arrived: bool,
    pub attacking: bool,
    pub capturing: bool,
    pub holds_usable_item: bool,
    /// The near target still resolves this frame.
    pub target_resolves: bool,
}

/// Arrival handling by target kind.
pub struct ActionDispatcher;

impl ActionDispatcher {
    /// Pick at most one action for this frame.
    ///
    /// Using a held item wins over any kind-specific action whenever the
    /// agent is free. A `Capture` action means the agent enters (or stays
    /// in) the capture-wait loop.
    pub fn dispatch(ctx: &DispatchContext) -> Option<Dispatch> {
        if ctx.attacking {
            return None;
        }
        if ctx.holds_usable_item && !ctx.capturing {
            return Some(Dispatch::Act(ActorAction::UseItem));
        }
        if ctx.capturing {
            return ctx
                .target
                .map(|target| Dispatch::Act(ActorAction::Capture(target.entity)));
        }
        if !ctx.arrived {
            return None;
        }

        let target = ctx.target?;
        let action = match target.kind {
            TargetKind::Item => ActorAction::PickUp(target.entity),
            TargetKind::Character if ctx.target_resolves => ActorAction::Attack(target.entity),
            TargetKind::Character => return None,
            TargetKind::Waypoint => return Some(Dispatch::ReachedWaypoint(target.entity)),
            TargetKind::Checkpoint => ActorAction::Capture(target.entity),
            TargetKind::None => return None,
        };
        Some(Dispatch::Act(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrived_at(kind: TargetKind) -> DispatchContext {
        DispatchContext {
            target: Some(HeldTarget {
                entity: Entity::from_raw(5),
                kind,
            }),
            arrived: true,
            target_resolves: true,
            ..Default::default()
        }
    }

    #[test]
    fn arrival_action_by_kind() {
        let target = Entity::from_raw(5);

        assert_eq!(
            ActionDispatcher::dispatch(&arrived_at(TargetKind::Item)),
            Some(Dispatch::Act(ActorAction::PickUp(target)))
        );
        assert_eq!(
            ActionDispatcher::dispatch(&arrived_at(TargetKind::Character)),
            Some(Dispatch::Act(ActorAction::Attack(target)))
        );
        assert_eq!(
            ActionDispatcher::dispatch(&arrived_at(TargetKind::Waypoint)),
            Some(Dispatch::ReachedWaypoint(target))
        );
        assert_eq!(
            ActionDispatcher::dispatch(&arrived_at(TargetKind::Checkpoint)),
            Some(Dispatch::Act(ActorAction::Capture(target)))
        );
    }

    #[test]
    fn nothing_happens_before_arrival_or_mid_attack() {
        let mut ctx = arrived_at(TargetKind::Character);
        ctx.arrived = false;
        assert_eq!(ActionDispatcher::dispatch(&ctx), None);

        let mut ctx = arrived_at(TargetKind::Character);
        ctx.attacking = true;
        assert_eq!(ActionDispatcher::dispatch(&ctx), None);
    }

    #[test]
    fn stale_character_is_not_attacked() {
        let mut ctx = arrived_at(TargetKind::Character);
        ctx.target_resolves = false;
        assert_eq!(ActionDispatcher::dispatch(&ctx), None);
    }

    #[test]
    fn usable_item_takes_priority() {
        let mut ctx = arrived_at(TargetKind::Character);
        ctx.holds_usable_item = true;
        assert_eq!(ActionDispatcher::dispatch(&ctx), Some(Dispatch::Act(ActorAction::UseItem)));

        ctx.arrived = false;
        assert_eq!(ActionDispatcher::dispatch(&ctx), Some(Dispatch::Act(ActorAction::UseItem)));
    }
}
