//! Arena bookkeeping driven by actor actions.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use super::components::*;
use crate::core::{
    ActionEvent, ActorAction, AgentTuning, CheckpointCapturedEvent, ItemPickupEvent,
    SectionChangedEvent,
};

/// Hand items to the characters that reached them.
pub fn handle_pickups(
    mut commands: Commands,
    mut actions: EventReader<ActionEvent>,
    mut pickups: Query<&mut Pickup>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
) {
    for event in actions.read() {
        let ActorAction::PickUp(item) = event.action else {
            continue;
        };
        let Ok(mut pickup) = pickups.get_mut(item) else {
            continue;
        };

        if pickup.picked_up || pickup.reserved_by.is_some_and(|owner| owner != event.actor) {
            debug!("{:?} missed {:?}", event.actor, item);
            continue;
        }

        pickup.picked_up = true;
        pickup.reserved_by = None;

        commands.entity(event.actor).insert(HeldItem {
            item: Some(item),
            usable: pickup.usable,
        });
        commands.entity(item).insert(Visibility::Hidden);

        pickup_events.send(ItemPickupEvent {
            item,
            picker: event.actor,
        });
    }
}

/// Consume held items on use.
pub fn use_held_items(mut actions: EventReader<ActionEvent>, mut holders: Query<&mut HeldItem>) {
    for event in actions.read() {
        if event.action != ActorAction::UseItem {
            continue;
        }
        let Ok(mut held) = holders.get_mut(event.actor) else {
            continue;
        };
        if let Some(item) = held.item.take() {
            debug!("{:?} used {:?}", event.actor, item);
        }
        held.usable = false;
    }
}

/// Record waypoint route progress announced by actors.
///
/// Entering another section starts its route from the first waypoint.
pub fn track_route_progress(
    mut commands: Commands,
    mut actions: EventReader<ActionEvent>,
    mut sections: EventReader<SectionChangedEvent>,
    mut routes: Query<&mut RouteProgress>,
) {
    for event in sections.read() {
        if let Ok(mut route) = routes.get_mut(event.entity) {
            route.next_waypoint = 0;
        }
    }

    for event in actions.read() {
        let ActorAction::AdvanceWaypoint(next_waypoint) = event.action else {
            continue;
        };

        match routes.get_mut(event.actor) {
            Ok(mut route) => route.next_waypoint = next_waypoint,
            Err(_) => {
                commands
                    .entity(event.actor)
                    .insert(RouteProgress { next_waypoint });
            }
        }
    }
}

/// Accumulate capture time for checkpoints held this frame.
///
/// Each team counts once per checkpoint no matter how many of its agents
/// stand in the zone. A zone held by two teams at once makes no progress.
pub fn capture_checkpoints(
    time: Res<Time>,
    tuning: Res<AgentTuning>,
    mut actions: EventReader<ActionEvent>,
    teams: Query<&Team>,
    mut checkpoints: Query<(Entity, &mut Checkpoint)>,
    mut captured: EventWriter<CheckpointCapturedEvent>,
) {
    let mut holders: HashMap<Entity, HashSet<TeamId>> = HashMap::new();
    for event in actions.read() {
        let ActorAction::Capture(checkpoint) = event.action else {
            continue;
        };
        let Ok(Team(team)) = teams.get(event.actor) else {
            continue;
        };
        holders.entry(checkpoint).or_default().insert(*team);
    }

    let dt = time.delta_secs();
    for (entity, mut checkpoint) in checkpoints.iter_mut() {
        let Some(present) = holders.get(&entity) else {
            if checkpoint.contested_by.is_some() {
                checkpoint.abandon_capture();
            }
            continue;
        };

        let mut present = present.iter();
        let (Some(&team), None) = (present.next(), present.next()) else {
            continue;
        };

        if checkpoint.advance_capture(team, dt, tuning.capture_time) {
            info!("Checkpoint {:?} captured by team {}", entity, team.0);
            captured.send(CheckpointCapturedEvent {
                checkpoint: entity,
                team,
            });
        }
    }
}
