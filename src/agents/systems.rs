//! Agent systems - brain lifecycle, thinking, and movement.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::brain::{Agent, Reservation};
use super::components::{AgentBrain, AgentMotion, AiControlled, ReservationRequest};
use super::view::ArenaQueries;
use super::world::AgentBody;
use crate::arena::{HeldItem, Pickup, SectionId, Team};
use crate::combat::CombatState;
use crate::core::{ActionEvent, AgentTuning, RespawnEvent, SectionChangedEvent};

/// System set ordering for agents.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgentSet {
    /// Brain creation, tuning and lifecycle events.
    Lifecycle,
    Think,
    Apply,
}

/// Attach a brain to newly marked characters.
#[allow(clippy::type_complexity)]
pub fn activate_agents(
    mut commands: Commands,
    tuning: Res<AgentTuning>,
    query: Query<
        (Entity, Option<&Team>, Option<&SectionId>),
        (With<AiControlled>, Without<AgentBrain>),
    >,
) {
    for (entity, team, section) in query.iter() {
        let mut agent = Agent::new(entity, section.copied().unwrap_or_default(), &tuning);
        let team = team.map(|team| team.0);

        if agent.activate(team) {
            info!("AI enabled for {:?} on {:?}", entity, team);
        } else {
            warn!("{:?} is AI controlled but has no team; it will stand still", entity);
        }

        commands
            .entity(entity)
            .insert((AgentBrain(agent), AgentMotion::default()));
    }
}

/// Wake inert brains once their character joins a team, and follow team
/// switches of active ones.
pub fn sync_agent_teams(mut brains: Query<(Entity, &mut AgentBrain, &Team), Changed<Team>>) {
    for (entity, mut brain, team) in brains.iter_mut() {
        if brain.0.team() == Some(team.0) {
            continue;
        }

        let was_active = brain.0.is_active();
        brain.0.activate(Some(team.0));
        if was_active {
            debug!("{:?} switched to {:?}", entity, team.0);
        } else {
            info!("AI enabled for {:?} on {:?}", entity, team.0);
        }
    }
}

/// Push changed retry intervals into every brain.
pub fn apply_agent_tuning(tuning: Res<AgentTuning>, mut brains: Query<&mut AgentBrain>) {
    for mut brain in brains.iter_mut() {
        brain.0.apply_tuning(&tuning);
    }
}

pub fn handle_section_changes(
    mut events: EventReader<SectionChangedEvent>,
    mut brains: Query<&mut AgentBrain>,
) {
    for event in events.read() {
        if let Ok(mut brain) = brains.get_mut(event.entity) {
            debug!("{:?} entered section {}", event.entity, event.section.0);
            brain.0.change_section(event.section);
        }
    }
}

pub fn handle_respawns(
    mut events: EventReader<RespawnEvent>,
    mut brains: Query<&mut AgentBrain>,
    mut reservations: EventWriter<ReservationRequest>,
) {
    for event in events.read() {
        let Ok(mut brain) = brains.get_mut(event.entity) else {
            continue;
        };

        for change in brain.0.reset() {
            reservations.send(ReservationRequest {
                agent: event.entity,
                change,
            });
        }
    }
}

/// Run one decision step for every agent.
#[allow(clippy::type_complexity)]
pub fn agent_think(
    time: Res<Time>,
    tuning: Res<AgentTuning>,
    arena: ArenaQueries,
    mut agents: Query<(
        Entity,
        &mut AgentBrain,
        &mut AgentMotion,
        &Transform,
        Option<&KinematicCharacterControllerOutput>,
        Option<&CombatState>,
        Option<&HeldItem>,
    )>,
    mut actions: EventWriter<ActionEvent>,
    mut reservations: EventWriter<ReservationRequest>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();
    let view = arena.snapshot();

    for (entity, mut brain, mut motion, transform, output, combat, held) in agents.iter_mut() {
        let body = AgentBody {
            position: transform.translation,
            // Without a controller there is no ground to fall from.
            grounded: output.map_or(true, |output| output.grounded),
            attacking: combat.is_some_and(|combat| combat.is_attacking),
            holds_usable_item: held.is_some_and(|held| held.item.is_some() && held.usable),
        };

        let frame = brain.0.update(&body, &view, &tuning, now, dt);

        motion.intent = frame.movement;
        for action in frame.actions {
            actions.send(ActionEvent {
                actor: entity,
                action,
            });
        }
        for change in frame.reservations {
            reservations.send(ReservationRequest {
                agent: entity,
                change,
            });
        }
    }
}

/// Apply reservation changes to the items.
pub fn apply_reservations(
    mut requests: EventReader<ReservationRequest>,
    mut pickups: Query<&mut Pickup>,
) {
    for request in requests.read() {
        match request.change {
            Reservation::Claim(item) => {
                let Ok(mut pickup) = pickups.get_mut(item) else {
                    continue;
                };
                if !pickup.picked_up && pickup.reserved_by.is_none() {
                    pickup.reserved_by = Some(request.agent);
                }
            }
            Reservation::Release(item) => {
                let Ok(mut pickup) = pickups.get_mut(item) else {
                    continue;
                };
                // Someone else may have claimed it in the meantime.
                if pickup.reserved_by == Some(request.agent) {
                    pickup.reserved_by = None;
                }
            }
        }
    }
}

/// Feed agent movement into the character controller.
pub fn move_agents(
    time: Res<Time>,
    mut agents: Query<(&AgentMotion, &mut Transform, Option<&mut KinematicCharacterController>)>,
) {
    let dt = time.delta_secs();

    for (motion, mut transform, controller) in agents.iter_mut() {
        let Some(intent) = motion.intent else {
            continue;
        };

        let translation = intent.velocity * dt;
        match controller {
            Some(mut controller) => controller.translation = Some(translation),
            // Bare transforms only move in the plane.
            None => transform.translation += Vec3::new(translation.x, 0.0, translation.z),
        }

        if let Some(face) = intent.face {
            let look_target = Vec3::new(face.x, transform.translation.y, face.z);
            if look_target.distance_squared(transform.translation) > 1e-6 {
                transform.look_at(look_target, Vec3::Y);
            }
        }
    }
}
