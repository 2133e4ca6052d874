//! Frame snapshot of the ECS arena for agent brains.

use std::collections::HashMap;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::target::{TargetBody, TargetInfo};
use super::world::WorldContext;
use crate::arena::{Checkpoint, Pickup, SectionId, Team, Waypoint};
use crate::combat::{Dead, Health};

/// Everything agents may look at, read-only.
#[derive(SystemParam)]
pub struct ArenaQueries<'w, 's> {
    pickups: Query<'w, 's, (Entity, &'static Transform, &'static Pickup)>,
    characters: Query<
        'w,
        's,
        (
            Entity,
            &'static Transform,
            Option<&'static Team>,
            Option<&'static Health>,
            Has<Dead>,
        ),
        Or<(With<Team>, With<Health>)>,
    >,
    waypoints: Query<'w, 's, (Entity, &'static Transform, &'static Waypoint)>,
    checkpoints: Query<'w, 's, (Entity, &'static Transform, &'static Checkpoint)>,
    rapier_context: Query<'w, 's, &'static RapierContext>,
}

impl ArenaQueries<'_, '_> {
    /// Freeze the arena for this frame.
    pub fn snapshot(&self) -> ArenaView<'_> {
        let mut targets = HashMap::new();

        for (entity, transform, pickup) in self.pickups.iter() {
            targets.insert(
                entity,
                TargetInfo {
                    position: transform.translation,
                    body: TargetBody::Item {
                        picked_up: pickup.picked_up,
                        reserved_by: pickup.reserved_by,
                    },
                },
            );
        }

        for (entity, transform, team, health, dead) in self.characters.iter() {
            let alive = !dead && health.map_or(true, |health| !health.is_dead());
            targets.insert(
                entity,
                TargetInfo {
                    position: transform.translation,
                    body: TargetBody::Character {
                        alive,
                        team: team.map(|team| team.0),
                    },
                },
            );
        }

        let mut waypoints: HashMap<SectionId, Vec<(u32, Entity)>> = HashMap::new();
        for (entity, transform, waypoint) in self.waypoints.iter() {
            waypoints
                .entry(waypoint.section)
                .or_default()
                .push((waypoint.order, entity));
            targets.insert(
                entity,
                TargetInfo {
                    position: transform.translation,
                    body: TargetBody::Waypoint,
                },
            );
        }

        let mut checkpoints: Vec<(u32, Entity)> = Vec::new();
        for (entity, transform, checkpoint) in self.checkpoints.iter() {
            checkpoints.push((checkpoint.order, entity));
            targets.insert(
                entity,
                TargetInfo {
                    position: transform.translation,
                    body: TargetBody::Checkpoint {
                        owner: checkpoint.owner,
                    },
                },
            );
        }

        ArenaView {
            targets,
            checkpoints: sorted(checkpoints),
            waypoints: waypoints
                .into_iter()
                .map(|(section, list)| (section, sorted(list)))
                .collect(),
            physics: self.rapier_context.get_single().ok(),
        }
    }
}

fn sorted(mut list: Vec<(u32, Entity)>) -> Vec<Entity> {
    list.sort_by_key(|&(order, entity)| (order, entity.index()));
    list.into_iter().map(|(_, entity)| entity).collect()
}

/// Read-only arena state for one frame.
pub struct ArenaView<'a> {
    targets: HashMap<Entity, TargetInfo>,
    checkpoints: Vec<Entity>,
    waypoints: HashMap<SectionId, Vec<Entity>>,
    physics: Option<&'a RapierContext>,
}

impl WorldContext for ArenaView<'_> {
    fn target(&self, entity: Entity) -> Option<TargetInfo> {
        self.targets.get(&entity).copied()
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity> {
        let mut hits = Vec::new();

        match self.physics {
            Some(context) => {
                let shape = Collider::ball(radius);
                context.intersections_with_shape(
                    center,
                    Quat::IDENTITY,
                    &shape,
                    QueryFilter::default(),
                    |entity| {
                        hits.push(entity);
                        true
                    },
                );
            }
            // No physics world, e.g. headless hosts.
            None => hits.extend(
                self.targets
                    .iter()
                    .filter(|(_, info)| info.position.distance(center) <= radius)
                    .map(|(&entity, _)| entity),
            ),
        }

        hits.sort_by_key(|entity| entity.index());
        hits.dedup();
        hits
    }

    fn checkpoints(&self) -> Vec<Entity> {
        self.checkpoints.clone()
    }

    fn section_waypoints(&self, section: SectionId) -> Vec<Entity> {
        self.waypoints.get(&section).cloned().unwrap_or_default()
    }
}
