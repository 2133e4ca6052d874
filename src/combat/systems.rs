//! Combat systems - attacks, cooldowns, damage and death.

use std::collections::HashSet;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use crate::arena::{Team, TeamId};
use crate::core::{ActionEvent, ActorAction, RespawnEvent};

/// System set ordering for combat.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSet {
    Action,
    Damage,
}

/// Configure combat systems.
pub fn setup_combat_systems(app: &mut App) {
    app
        // Events
        .add_event::<DamageEvent>()
        .add_event::<DeathEvent>()

        // System ordering
        .configure_sets(Update, (CombatSet::Action, CombatSet::Damage).chain())

        // Action systems
        .add_systems(
            Update,
            (revive_on_respawn, update_cooldowns, execute_attacks)
                .chain()
                .in_set(CombatSet::Action),
        )

        // Damage systems
        .add_systems(
            Update,
            (apply_damage, report_deaths).chain().in_set(CombatSet::Damage),
        );
}

/// Teammates never hurt each other; characters without a team hurt anyone.
pub fn can_hurt(attacker: Option<TeamId>, victim: Option<TeamId>) -> bool {
    match (attacker, victim) {
        (Some(attacker), Some(victim)) => attacker != victim,
        _ => true,
    }
}

/// Start attacks requested by agents and combo detection.
#[allow(clippy::type_complexity)]
fn execute_attacks(
    mut actions: EventReader<ActionEvent>,
    mut attackers: Query<(&Transform, &mut CombatState, &Weapon, Option<&Team>), Without<Dead>>,
    targets: Query<(&Transform, Option<&Team>), (With<Health>, Without<Dead>)>,
    rapier_context: Query<&RapierContext>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    for event in actions.read() {
        if !matches!(event.action, ActorAction::Attack(_) | ActorAction::Special(_)) {
            continue;
        }

        let Ok((transform, mut combat, weapon, team)) = attackers.get_mut(event.actor) else {
            continue;
        };
        let team = team.map(|team| team.0);
        if !combat.can_attack() {
            continue;
        }

        combat.is_attacking = true;
        combat.attack_cooldown = weapon.attack_cooldown;

        match event.action {
            ActorAction::Attack(target) => {
                let Ok((target_transform, target_team)) = targets.get(target) else {
                    continue;
                };
                if !can_hurt(team, target_team.map(|team| team.0)) {
                    continue;
                }
                if target_transform.translation.distance(transform.translation) <= weapon.reach {
                    damage_events.send(DamageEvent {
                        target,
                        source: event.actor,
                        amount: weapon.base_damage,
                    });
                }
            }
            ActorAction::Special(special) => {
                // Specials hit every opponent around the attacker.
                let Ok(context) = rapier_context.get_single() else {
                    continue;
                };
                let amount = weapon.base_damage * Weapon::special_multiplier(special);
                let shape = Collider::ball(weapon.reach);

                context.intersections_with_shape(
                    transform.translation,
                    Quat::IDENTITY,
                    &shape,
                    QueryFilter::default().exclude_collider(event.actor),
                    |hit_entity| {
                        let hostile = targets.get(hit_entity).is_ok_and(|(_, victim)| {
                            can_hurt(team, victim.map(|victim| victim.0))
                        });
                        if hostile {
                            damage_events.send(DamageEvent {
                                target: hit_entity,
                                source: event.actor,
                                amount,
                            });
                        }
                        true // Continue checking other entities
                    },
                );
            }
            _ => {}
        }
    }
}

/// Update combat cooldowns.
fn update_cooldowns(time: Res<Time>, mut query: Query<(&mut CombatState, &Weapon)>) {
    for (mut combat, weapon) in query.iter_mut() {
        if combat.attack_cooldown > 0.0 {
            combat.attack_cooldown -= time.delta_secs();

            // The swing itself occupies the first 60% of the cooldown.
            let recovery = weapon.attack_cooldown * 0.4;
            if combat.is_attacking && combat.attack_cooldown <= recovery {
                combat.is_attacking = false;
            }
        } else {
            combat.is_attacking = false;
        }
    }
}

/// Apply damage to entities.
fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut health_query: Query<&mut Health, Without<Dead>>,
    mut death_events: EventWriter<DeathEvent>,
) {
    // Track entities that died this frame to avoid duplicate death events
    let mut died_this_frame = HashSet::new();

    for event in damage_events.read() {
        if died_this_frame.contains(&event.target) {
            continue;
        }

        let Ok(mut health) = health_query.get_mut(event.target) else {
            continue;
        };

        health.take_damage(event.amount);

        if health.is_dead() {
            died_this_frame.insert(event.target);
            commands.entity(event.target).insert(Dead);
            death_events.send(DeathEvent {
                entity: event.target,
                killed_by: Some(event.source),
            });
        }
    }
}

fn report_deaths(mut death_events: EventReader<DeathEvent>) {
    for event in death_events.read() {
        info!("{:?} was knocked out by {:?}", event.entity, event.killed_by);
    }
}

/// Bring respawned characters back to full health.
fn revive_on_respawn(
    mut commands: Commands,
    mut respawns: EventReader<RespawnEvent>,
    mut query: Query<(Option<&mut Health>, Option<&mut CombatState>)>,
) {
    for event in respawns.read() {
        let Ok((health, combat)) = query.get_mut(event.entity) else {
            continue;
        };

        if let Some(mut health) = health {
            health.restore();
        }
        if let Some(mut combat) = combat {
            *combat = CombatState::default();
        }
        commands.entity(event.entity).remove::<Dead>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teammates_are_spared() {
        assert!(!can_hurt(Some(TeamId(1)), Some(TeamId(1))));
        assert!(can_hurt(Some(TeamId(1)), Some(TeamId(2))));
    }

    #[test]
    fn unaffiliated_characters_can_be_hit() {
        assert!(can_hurt(Some(TeamId(1)), None));
        assert!(can_hurt(None, Some(TeamId(1))));
        assert!(can_hurt(None, None));
    }
}
