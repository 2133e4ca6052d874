//! Tiered target discovery.
//!
//! Each tier is a cooperative routine stepped once per frame. A tier is
//! `Idle` until started, `Running` while it owes an attempt, and
//! `PendingRetryUntil(t)` while sleeping after a failed attempt. Starting a
//! tier that is not idle does nothing, so at most one scan per tier exists.

use bevy::prelude::*;

use super::target::HeldTarget;
use super::validation::TargetValidator;
use crate::arena::{GameMode, SectionId};

/// Lifecycle of one scan routine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Running,
    PendingRetryUntil(f32),
}

/// One scan tier with its retry interval.
#[derive(Debug, Clone, Default)]
pub struct ScanTier {
    state: ScanState,
    retry_interval: f32,
    attempts: u32,
}

impl ScanTier {
    pub fn new(retry_interval: f32) -> Self {
        Self {
            retry_interval,
            ..default()
        }
    }

    /// Begin scanning. Returns `false` if a scan is already in flight.
    pub fn start(&mut self) -> bool {
        if self.state != ScanState::Idle {
            return false;
        }
        self.state = ScanState::Running;
        true
    }

    /// Abandon the in-flight scan, if any.
    pub fn cancel(&mut self) {
        self.state = ScanState::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.state != ScanState::Idle
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Number of searches performed since creation.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn set_retry_interval(&mut self, retry_interval: f32) {
        self.retry_interval = retry_interval;
    }

    fn is_due(&self, now: f32) -> bool {
        match self.state {
            ScanState::Idle => false,
            ScanState::Running => true,
            ScanState::PendingRetryUntil(wake) => now >= wake,
        }
    }

    fn finish(&mut self) {
        self.state = ScanState::Idle;
    }

    fn sleep(&mut self, now: f32) {
        self.state = ScanState::PendingRetryUntil(now + self.retry_interval);
    }
}

/// Both scan tiers of one agent plus the distance tier's progress.
#[derive(Debug, Clone, Default)]
pub struct TargetScanner {
    pub near: ScanTier,
    pub distance: ScanTier,
    /// Next waypoint to visit in the current section.
    pub waypoint_index: u32,
    /// Checkpoint the last distance scan settled on.
    pub checkpoint_index: usize,
}

impl TargetScanner {
    pub fn new(near_retry_interval: f32, distance_retry_interval: f32) -> Self {
        Self {
            near: ScanTier::new(near_retry_interval),
            distance: ScanTier::new(distance_retry_interval),
            waypoint_index: 0,
            checkpoint_index: 0,
        }
    }

    /// Forget distance progress and any in-flight distance scan.
    pub fn reset_distance(&mut self) {
        self.distance.cancel();
        self.waypoint_index = 0;
        self.checkpoint_index = 0;
    }

    /// Step the near scan. Returns a newly found near target.
    ///
    /// `holding_valid_near` ends the scan without searching. `ignored` is
    /// never picked, even when it is the closest candidate.
    pub fn poll_near(
        &mut self,
        now: f32,
        validator: &TargetValidator,
        holding_valid_near: bool,
        ignored: Option<Entity>,
    ) -> Option<HeldTarget> {
        if !self.near.is_due(now) {
            return None;
        }
        if holding_valid_near {
            self.near.finish();
            return None;
        }

        self.near.attempts += 1;

        let origin = validator.position;
        let found = validator
            .world
            .overlap_sphere(origin, validator.tuning.near_scan_radius)
            .into_iter()
            .filter(|&entity| Some(entity) != ignored)
            .filter(|&entity| validator.is_valid_near_target(Some(entity)))
            .filter_map(|entity| {
                let info = validator.world.target(entity)?;
                Some((entity, info.position.distance_squared(origin), info.body.kind()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.index().cmp(&b.0.index())));

        match found {
            Some((entity, _, kind)) => {
                self.near.finish();
                Some(HeldTarget { entity, kind })
            }
            None => {
                self.near.sleep(now);
                None
            }
        }
    }

    /// Step the distance scan. Returns a newly found map objective.
    pub fn poll_distance(
        &mut self,
        now: f32,
        validator: &TargetValidator,
        section: SectionId,
        mode: GameMode,
        holding_valid_distance: bool,
    ) -> Option<HeldTarget> {
        if !self.distance.is_due(now) {
            return None;
        }
        if holding_valid_distance {
            self.distance.finish();
            return None;
        }

        self.distance.attempts += 1;

        let found = match mode {
            GameMode::Waypoints => self.next_waypoint(validator, section),
            GameMode::Checkpoints => self.next_checkpoint(validator),
        };

        match found {
            Some(target) => {
                self.distance.finish();
                Some(target)
            }
            None => {
                self.distance.sleep(now);
                None
            }
        }
    }

    fn next_waypoint(&self, validator: &TargetValidator, section: SectionId) -> Option<HeldTarget> {
        let waypoints = validator.world.section_waypoints(section);
        let entity = *waypoints.get(self.waypoint_index as usize)?;

        validator
            .is_valid_distance_target(Some(entity))
            .then(|| HeldTarget {
                entity,
                kind: validator.kind_of(entity),
            })
    }

    fn next_checkpoint(&mut self, validator: &TargetValidator) -> Option<HeldTarget> {
        let checkpoints = validator.world.checkpoints();
        let count = checkpoints.len();
        if count == 0 {
            return None;
        }

        let start = self.checkpoint_index % count;
        let index = (0..count)
            .map(|step| (start + step) % count)
            .find(|&index| validator.is_valid_distance_target(Some(checkpoints[index])))?;

        self.checkpoint_index = index;
        let entity = checkpoints[index];
        Some(HeldTarget {
            entity,
            kind: validator.kind_of(entity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::target::TargetKind;
    use crate::agents::testing::ScriptedWorld;
    use crate::arena::TeamId;
    use crate::core::AgentTuning;

    const RED: TeamId = TeamId(1);
    const BLUE: TeamId = TeamId(2);

    fn validator<'a>(world: &'a ScriptedWorld, tuning: &'a AgentTuning) -> TargetValidator<'a> {
        TargetValidator::new(Entity::from_raw(1), RED, Vec3::ZERO, tuning, world)
    }

    #[test]
    fn idle_tier_does_not_search() {
        let world = ScriptedWorld::default();
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);

        assert_eq!(scanner.poll_near(0.0, &validator(&world, &tuning), false, None), None);
        assert_eq!(world.overlap_queries.get(), 0);
    }

    #[test]
    fn second_start_is_a_no_op() {
        let mut world = ScriptedWorld::default();
        let enemy = world.character(10, Vec3::new(2.0, 0.0, 0.0), Some(BLUE));
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);

        assert!(scanner.near.start());
        assert!(!scanner.near.start());

        let found = scanner.poll_near(0.0, &validator(&world, &tuning), false, None);
        assert_eq!(found.map(|t| t.entity), Some(enemy));
        assert_eq!(scanner.near.attempts(), 1);

        // Finished: no second commit.
        assert_eq!(scanner.poll_near(0.1, &validator(&world, &tuning), false, None), None);
        assert_eq!(world.overlap_queries.get(), 1);
    }

    #[test]
    fn nearest_valid_candidate_wins() {
        let mut world = ScriptedWorld::default();
        world.character(10, Vec3::new(6.0, 0.0, 0.0), Some(BLUE));
        world.character(11, Vec3::new(1.0, 0.0, 0.0), Some(RED));
        let close = world.item(12, Vec3::new(3.0, 0.0, 0.0));
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);
        scanner.near.start();

        let found = scanner.poll_near(0.0, &validator(&world, &tuning), false, None).unwrap();
        assert_eq!(
            found,
            HeldTarget {
                entity: close,
                kind: TargetKind::Item
            }
        );
    }

    #[test]
    fn ignored_candidate_is_skipped() {
        let mut world = ScriptedWorld::default();
        let closest = world.character(10, Vec3::new(1.0, 0.0, 0.0), Some(BLUE));
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);

        scanner.near.start();
        let found = scanner.poll_near(0.0, &validator(&world, &tuning), false, Some(closest));
        assert_eq!(found, None);
        assert_eq!(scanner.near.state(), ScanState::PendingRetryUntil(0.5));

        let other = world.character(11, Vec3::new(4.0, 0.0, 0.0), Some(BLUE));
        let found = scanner.poll_near(0.5, &validator(&world, &tuning), false, Some(closest));
        assert_eq!(found.map(|t| t.entity), Some(other));
    }

    #[test]
    fn failed_scan_sleeps_for_retry_interval() {
        let mut world = ScriptedWorld::default();
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);
        scanner.near.start();

        assert_eq!(scanner.poll_near(1.0, &validator(&world, &tuning), false, None), None);
        assert_eq!(scanner.near.state(), ScanState::PendingRetryUntil(1.5));

        let enemy = world.character(10, Vec3::new(2.0, 0.0, 0.0), Some(BLUE));
        assert_eq!(scanner.poll_near(1.25, &validator(&world, &tuning), false, None), None);
        assert_eq!(world.overlap_queries.get(), 1);

        let found = scanner.poll_near(1.5, &validator(&world, &tuning), false, None);
        assert_eq!(found.map(|t| t.entity), Some(enemy));
        assert!(!scanner.near.is_active());
    }

    #[test]
    fn scan_ends_without_searching_when_target_already_held() {
        let world = ScriptedWorld::default();
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);
        scanner.near.start();

        assert_eq!(scanner.poll_near(0.0, &validator(&world, &tuning), true, None), None);
        assert!(!scanner.near.is_active());
        assert_eq!(world.overlap_queries.get(), 0);
    }

    #[test]
    fn waypoints_are_visited_in_order() {
        let mut world = ScriptedWorld::default();
        let section = SectionId(3);
        let first = world.waypoint(10, Vec3::new(20.0, 0.0, 0.0), section);
        let second = world.waypoint(11, Vec3::new(40.0, 0.0, 0.0), section);
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);

        scanner.distance.start();
        let found = scanner.poll_distance(
            0.0,
            &validator(&world, &tuning),
            section,
            GameMode::Waypoints,
            false,
        );
        assert_eq!(found.map(|t| t.entity), Some(first));

        scanner.waypoint_index += 1;
        scanner.distance.start();
        let found = scanner.poll_distance(
            1.0,
            &validator(&world, &tuning),
            section,
            GameMode::Waypoints,
            false,
        );
        assert_eq!(
            found,
            Some(HeldTarget {
                entity: second,
                kind: TargetKind::Waypoint
            })
        );

        scanner.waypoint_index += 1;
        scanner.distance.start();
        let found = scanner.poll_distance(
            2.0,
            &validator(&world, &tuning),
            section,
            GameMode::Waypoints,
            false,
        );
        assert_eq!(found, None);
        assert_eq!(scanner.distance.state(), ScanState::PendingRetryUntil(4.0));
    }

    #[test]
    fn checkpoint_scan_skips_friendly_and_remembers_index() {
        let mut world = ScriptedWorld::default();
        world.checkpoint(10, Vec3::ZERO, Some(RED));
        let hostile = world.checkpoint(11, Vec3::ZERO, Some(BLUE));
        let neutral = world.checkpoint(12, Vec3::ZERO, None);
        let tuning = AgentTuning::default();
        let mut scanner = TargetScanner::new(0.5, 2.0);

        scanner.distance.start();
        let found = scanner.poll_distance(
            0.0,
            &validator(&world, &tuning),
            SectionId(0),
            GameMode::Checkpoints,
            false,
        );
        assert_eq!(
            found,
            Some(HeldTarget {
                entity: hostile,
                kind: TargetKind::Checkpoint
            })
        );
        assert_eq!(scanner.checkpoint_index, 1);

        world.set_owner(hostile, Some(RED));
        scanner.distance.start();
        let found = scanner.poll_distance(
            1.0,
            &validator(&world, &tuning),
            SectionId(0),
            GameMode::Checkpoints,
            false,
        );
        assert_eq!(found.map(|t| t.entity), Some(neutral));
        assert_eq!(scanner.checkpoint_index, 2);
    }

    #[test]
    fn reset_distance_cancels_and_forgets_progress() {
        let mut scanner = TargetScanner::new(0.5, 2.0);
        scanner.distance.start();
        scanner.waypoint_index = 4;
        scanner.checkpoint_index = 2;

        scanner.reset_distance();

        assert!(!scanner.distance.is_active());
        assert_eq!(scanner.waypoint_index, 0);
        assert_eq!(scanner.checkpoint_index, 0);
    }
}
