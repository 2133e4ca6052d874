//! In-memory arena for exercising agent logic without an app.

use std::cell::Cell;
use std::collections::HashMap;

use bevy::prelude::*;

use super::target::{TargetBody, TargetInfo};
use super::world::WorldContext;
use crate::arena::{SectionId, TeamId};

#[derive(Default)]
pub struct ScriptedWorld {
    pub targets: HashMap<Entity, TargetInfo>,
    pub checkpoints: Vec<Entity>,
    pub waypoints: HashMap<SectionId, Vec<Entity>>,
    pub overlap_queries: Cell<u32>,
}

impl ScriptedWorld {
    pub fn item(&mut self, id: u32, position: Vec3) -> Entity {
        self.insert(
            id,
            position,
            TargetBody::Item {
                picked_up: false,
                reserved_by: None,
            },
        )
    }

    pub fn character(&mut self, id: u32, position: Vec3, team: Option<TeamId>) -> Entity {
        self.insert(
            id,
            position,
            TargetBody::Character { alive: true, team },
        )
    }

    pub fn waypoint(&mut self, id: u32, position: Vec3, section: SectionId) -> Entity {
        let entity = self.insert(id, position, TargetBody::Waypoint);
        self.waypoints.entry(section).or_default().push(entity);
        entity
    }

    pub fn checkpoint(&mut self, id: u32, position: Vec3, owner: Option<TeamId>) -> Entity {
        let entity = self.insert(id, position, TargetBody::Checkpoint { owner });
        self.checkpoints.push(entity);
        entity
    }

    pub fn remove(&mut self, entity: Entity) {
        self.targets.remove(&entity);
    }

    pub fn move_to(&mut self, entity: Entity, position: Vec3) {
        if let Some(info) = self.targets.get_mut(&entity) {
            info.position = position;
        }
    }

    pub fn kill(&mut self, entity: Entity) {
        if let Some(TargetBody::Character { alive, .. }) = self.body_mut(entity) {
            *alive = false;
        }
    }

    pub fn pick_up(&mut self, entity: Entity) {
        if let Some(TargetBody::Item { picked_up, reserved_by }) = self.body_mut(entity) {
            *picked_up = true;
            *reserved_by = None;
        }
    }

    pub fn reserve(&mut self, entity: Entity, by: Option<Entity>) {
        if let Some(TargetBody::Item { reserved_by, .. }) = self.body_mut(entity) {
            *reserved_by = by;
        }
    }

    pub fn set_owner(&mut self, entity: Entity, team: Option<TeamId>) {
        if let Some(TargetBody::Checkpoint { owner, .. }) = self.body_mut(entity) {
            *owner = team;
        }
    }

    fn insert(&mut self, id: u32, position: Vec3, body: TargetBody) -> Entity {
        let entity = Entity::from_raw(id);
        self.targets.insert(entity, TargetInfo { position, body });
        entity
    }

    fn body_mut(&mut self, entity: Entity) -> Option<&mut TargetBody> {
        self.targets.get_mut(&entity).map(|info| &mut info.body)
    }
}

impl WorldContext for ScriptedWorld {
    fn target(&self, entity: Entity) -> Option<TargetInfo> {
        self.targets.get(&entity).copied()
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Entity> {
        self.overlap_queries.set(self.overlap_queries.get() + 1);

        let mut hits: Vec<Entity> = self
            .targets
            .iter()
            .filter(|(_, info)| info.position.distance(center) <= radius)
            .map(|(&entity, _)| entity)
            .collect();
        hits.sort_by_key(|entity| entity.index());
        hits
    }

    fn checkpoints(&self) -> Vec<Entity> {
        self.checkpoints
            .iter()
            .copied()
            .filter(|entity| self.targets.contains_key(entity))
            .collect()
    }

    fn section_waypoints(&self, section: SectionId) -> Vec<Entity> {
        self.waypoints.get(&section).cloned().unwrap_or_default()
    }
}
