//! Per-frame decision step of an autonomous agent.
//!
//! Within one frame the order is fixed: validate the current target, acquire
//! a new one if needed, compute movement, dispatch an action, then let the
//! scan routines resume. Later steps read what earlier ones wrote.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::dispatch::{ActionDispatcher, Dispatch, DispatchContext};
use super::holder::DistanceHolder;
use super::scanner::TargetScanner;
use super::target::{HeldTarget, TargetKind, Tier};
use super::validation::{LossReason, TargetStatus, TargetValidator};
use super::world::{AgentBody, WorldContext};
use crate::arena::{SectionId, TeamId};
use crate::core::{ActorAction, AgentTuning};

/// Velocity and facing the character controller should apply this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MovementIntent {
    /// Horizontal path-follow velocity plus the separately integrated
    /// vertical velocity.
    pub velocity: Vec3,
    /// World point to turn toward, if any.
    pub face: Option<Vec3>,
}

/// Change to an item's reservation requested by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Claim(Entity),
    /// Only honored if the item is still reserved by the requesting agent.
    Release(Entity),
}

/// Everything an agent decided in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentFrame {
    /// `None` when the agent is inactive and must not touch the controller.
    pub movement: Option<MovementIntent>,
    pub actions: Vec<ActorAction>,
    pub reservations: Vec<Reservation>,
}

/// Cognition state of one controllable character.
#[derive(Debug, Clone)]
pub struct Agent {
    entity: Entity,
    team: Option<TeamId>,
    section: SectionId,
    active: bool,
    near: Option<HeldTarget>,
    distance: Option<HeldTarget>,
    current: Option<Tier>,
    follow_time: f32,
    scanner: TargetScanner,
    holder: Option<DistanceHolder>,
    capturing: Option<Entity>,
    /// Character given up after a follow timeout, and when the near scan
    /// may consider it again.
    abandoned: Option<(Entity, f32)>,
    vertical_velocity: f32,
    rng: StdRng,
}

impl Agent {
    pub fn new(entity: Entity, section: SectionId, tuning: &AgentTuning) -> Self {
        Self {
            entity,
            team: None,
            section,
            active: false,
            near: None,
            distance: None,
            current: None,
            follow_time: 0.0,
            scanner: TargetScanner::new(tuning.near_retry_interval, tuning.distance_retry_interval),
            holder: None,
            capturing: None,
            abandoned: None,
            vertical_velocity: 0.0,
            rng: StdRng::seed_from_u64(entity.to_bits()),
        }
    }

    /// Start thinking. Characters without a team stay inert.
    ///
    /// Calling this again on an active agent only updates its team.
    pub fn activate(&mut self, team: Option<TeamId>) -> bool {
        let Some(team) = team else {
            debug!("{:?} has no team, AI stays off", self.entity);
            return self.active;
        };

        self.team = Some(team);
        if self.active {
            return true;
        }
        self.active = true;
        self.scanner.near.start();
        self.scanner.distance.start();
        true
    }

    /// Move to another level section, discarding the distance objective.
    pub fn change_section(&mut self, section: SectionId) {
        if section == self.section {
            return;
        }
        self.section = section;

        if self.current == Some(Tier::Distance) {
            self.stop_pursuit();
        }
        self.distance = None;
        self.scanner.reset_distance();

        if self.active {
            self.scanner.distance.start();
        }
    }

    /// Forget everything after a respawn. Returns reservations to give back.
    pub fn reset(&mut self) -> Vec<Reservation> {
        let mut released = Vec::new();
        if let Some(near) = self.near.take() {
            if near.kind == TargetKind::Item {
                released.push(Reservation::Release(near.entity));
            }
        }

        self.stop_pursuit();
        self.distance = None;
        self.abandoned = None;
        self.follow_time = 0.0;
        self.vertical_velocity = 0.0;
        self.scanner.near.cancel();
        self.scanner.reset_distance();

        if self.active {
            self.scanner.near.start();
            self.scanner.distance.start();
        }
        released
    }

    /// Pick up retry intervals from new tuning.
    pub fn apply_tuning(&mut self, tuning: &AgentTuning) {
        self.scanner.near.set_retry_interval(tuning.near_retry_interval);
        self.scanner.distance.set_retry_interval(tuning.distance_retry_interval);
    }

    /// Run one frame of decision making.
    pub fn update(
        &mut self,
        body: &AgentBody,
        world: &dyn WorldContext,
        tuning: &AgentTuning,
        now: f32,
        dt: f32,
    ) -> AgentFrame {
        let mut frame = AgentFrame::default();
        let Some(team) = self.team.filter(|_| self.active) else {
            return frame;
        };

        self.follow_time += dt;
        let validator = TargetValidator::new(self.entity, team, body.position, tuning, world);

        if let Some(status) = validator.current_target_status(self) {
            if !status.is_valid() {
                self.release(status, now, tuning, &mut frame);
            }
        }

        if self.current.is_none() {
            self.acquire(&validator, &mut frame);
        }

        let (movement, arrived) = self.steer(body, world, tuning, dt);
        frame.movement = Some(movement);

        self.dispatch(body, world, arrived, &mut frame);
        self.resume_scans(&validator, now, &mut frame);

        frame
    }

    fn release(
        &mut self,
        status: TargetStatus,
        now: f32,
        tuning: &AgentTuning,
        frame: &mut AgentFrame,
    ) {
        let Some(tier) = self.current else {
            return;
        };
        self.stop_pursuit();

        let TargetStatus::Lost(reason) = status else {
            debug!("{:?} set aside its objective for a near target", self.entity);
            return;
        };

        match tier {
            Tier::Near => {
                if let Some(near) = self.near.take() {
                    debug!(
                        "{:?} released {:?} {:?}: {:?}",
                        self.entity, near.kind, near.entity, reason
                    );
                    if near.kind == TargetKind::Item && reason != LossReason::PickedUp {
                        frame.reservations.push(Reservation::Release(near.entity));
                    }
                    if reason == LossReason::FollowTimeout {
                        self.abandoned = Some((near.entity, now + tuning.max_follow_time));
                    }
                }
            }
            Tier::Distance => {
                if let Some(distance) = self.distance.take() {
                    debug!(
                        "{:?} released {:?} {:?}: {:?}",
                        self.entity, distance.kind, distance.entity, reason
                    );
                }
            }
        }
    }

    fn acquire(&mut self, validator: &TargetValidator, frame: &mut AgentFrame) {
        if let Some(near) = self.near {
            if validator.is_valid_near_target(Some(near.entity)) {
                self.engage(Tier::Near, near, validator, frame);
                return;
            }
            self.near = None;
            if near.kind == TargetKind::Item {
                frame.reservations.push(Reservation::Release(near.entity));
            }
        }

        if let Some(distance) = self.distance {
            if validator.is_valid_distance_target(Some(distance.entity)) {
                self.engage(Tier::Distance, distance, validator, frame);
                // A closer threat may still show up on the way.
                self.scanner.near.start();
                return;
            }
            self.distance = None;
        }

        self.scanner.near.start();
        self.scanner.distance.start();
    }

    fn engage(
        &mut self,
        tier: Tier,
        target: HeldTarget,
        validator: &TargetValidator,
        frame: &mut AgentFrame,
    ) {
        let tuning = validator.tuning;
        let (offset, randomize) = match target.kind {
            TargetKind::Character => (tuning.melee_range, false),
            TargetKind::Checkpoint => (tuning.checkpoint_buffer, true),
            TargetKind::Item => (0.0, false),
            TargetKind::Waypoint | TargetKind::None => (tuning.generic_buffer, false),
        };

        self.holder
            .get_or_insert_with(DistanceHolder::default)
            .configure(target.entity, offset, randomize, tuning.jitter_radius, &mut self.rng);

        self.current = Some(tier);
        self.follow_time = 0.0;

        if target.kind == TargetKind::Item {
            frame.reservations.push(Reservation::Claim(target.entity));
        }
        debug!("{:?} now pursuing {:?} {:?}", self.entity, target.kind, target.entity);
    }

    fn steer(
        &mut self,
        body: &AgentBody,
        world: &dyn WorldContext,
        tuning: &AgentTuning,
        dt: f32,
    ) -> (MovementIntent, bool) {
        self.vertical_velocity = if body.grounded {
            tuning.ground_stick_velocity
        } else {
            self.vertical_velocity - tuning.gravity * dt
        };
        let vertical = Vec3::Y * self.vertical_velocity;
        let gravity_only = MovementIntent {
            velocity: vertical,
            face: None,
        };

        let Some(target) = self.current_target() else {
            return (gravity_only, false);
        };
        let (Some(info), Some(holder)) = (world.target(target.entity), self.holder.as_ref()) else {
            return (gravity_only, false);
        };

        let goal = holder.goal(info.position);
        let stand_off = holder.offset() + tuning.arrival_tolerance;
        let step = world.path_step(body.position, goal, stand_off, tuning.move_speed);

        if step.arrived || self.capturing.is_some() {
            let movement = MovementIntent {
                velocity: vertical,
                face: Some(info.position),
            };
            return (movement, step.arrived);
        }

        let mut horizontal = Vec3::new(step.velocity.x, 0.0, step.velocity.z);
        // Don't overshoot; stop well inside the arrival band.
        let stop_at = holder.offset() + tuning.arrival_tolerance * 0.5;
        let remaining =
            Vec3::new(goal.x - body.position.x, 0.0, goal.z - body.position.z).length() - stop_at;
        if dt > 0.0 && horizontal.length() * dt > remaining {
            horizontal = horizontal.normalize_or_zero() * (remaining.max(0.0) / dt);
        }

        let face = (horizontal != Vec3::ZERO).then(|| body.position + horizontal);
        let movement = MovementIntent {
            velocity: horizontal + vertical,
            face,
        };
        (movement, false)
    }

    fn dispatch(
        &mut self,
        body: &AgentBody,
        world: &dyn WorldContext,
        arrived: bool,
        frame: &mut AgentFrame,
    ) {
        let target = self.current_target();
        let ctx = DispatchContext {
            target,
            arrived,
            attacking: body.attacking,
            capturing: self.capturing.is_some(),
            holds_usable_item: body.holds_usable_item,
            target_resolves: target.is_some_and(|held| world.target(held.entity).is_some()),
        };

        match ActionDispatcher::dispatch(&ctx) {
            Some(Dispatch::Act(action)) => {
                if let ActorAction::Capture(checkpoint) = action {
                    if self.capturing.is_none() {
                        debug!("{:?} started capturing {:?}", self.entity, checkpoint);
                        self.capturing = Some(checkpoint);
                    }
                }
                frame.actions.push(action);
            }
            Some(Dispatch::ReachedWaypoint(waypoint)) => {
                self.scanner.waypoint_index += 1;
                debug!(
                    "{:?} reached waypoint {:?}, heading to #{}",
                    self.entity, waypoint, self.scanner.waypoint_index
                );
                self.stop_pursuit();
                self.distance = None;
                self.scanner.distance.start();
                frame
                    .actions
                    .push(ActorAction::AdvanceWaypoint(self.scanner.waypoint_index));
            }
            None => {}
        }
    }

    fn resume_scans(&mut self, validator: &TargetValidator, now: f32, frame: &mut AgentFrame) {
        let holding_near = validator.is_valid_near_target(self.near.map(|held| held.entity));
        if self.abandoned.is_some_and(|(_, until)| now >= until) {
            self.abandoned = None;
        }
        let ignored = self.abandoned.map(|(entity, _)| entity);

        if let Some(found) = self.scanner.poll_near(now, validator, holding_near, ignored) {
            debug!("{:?} spotted {:?} {:?}", self.entity, found.kind, found.entity);
            if let Some(stale) = self.near.replace(found) {
                if stale.kind == TargetKind::Item && stale.entity != found.entity {
                    frame.reservations.push(Reservation::Release(stale.entity));
                }
            }
        }

        let holding_distance =
            validator.is_valid_distance_target(self.distance.map(|held| held.entity));
        if let Some(found) = self.scanner.poll_distance(
            now,
            validator,
            self.section,
            validator.tuning.game_mode,
            holding_distance,
        ) {
            debug!("{:?} set objective {:?} {:?}", self.entity, found.kind, found.entity);
            self.distance = Some(found);
        }
    }

    fn stop_pursuit(&mut self) {
        self.current = None;
        self.capturing = None;
        if let Some(holder) = self.holder.as_mut() {
            holder.clear();
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    pub fn section(&self) -> SectionId {
        self.section
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_tier(&self) -> Option<Tier> {
        self.current
    }

    /// The target being pursued right now.
    pub fn current_target(&self) -> Option<HeldTarget> {
        match self.current? {
            Tier::Near => self.near,
            Tier::Distance => self.distance,
        }
    }

    pub fn target_kind(&self) -> TargetKind {
        self.current_target().map_or(TargetKind::None, |held| held.kind)
    }

    pub fn near_target(&self) -> Option<HeldTarget> {
        self.near
    }

    pub fn distance_target(&self) -> Option<HeldTarget> {
        self.distance
    }

    /// Seconds since the current target was acquired.
    pub fn follow_time(&self) -> f32 {
        self.follow_time
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.is_some()
    }

    pub fn scanner(&self) -> &TargetScanner {
        &self.scanner
    }

    pub fn steering_proxy(&self) -> Option<&DistanceHolder> {
        self.holder.as_ref()
    }
}
