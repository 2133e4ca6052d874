//! Steering proxy placed near an agent's real target.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

/// Marker the movement primitive steers toward.
///
/// Wraps the real target with a stand-off distance and, when randomized, a
/// lateral jitter so agents converging on one spot spread out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistanceHolder {
    target: Option<Entity>,
    offset: f32,
    randomize: bool,
    jitter: Vec3,
}

impl DistanceHolder {
    /// Point the proxy at a newly acquired target.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is negative or not finite; steering cannot work
    /// without a usable stand-off distance.
    pub fn configure(
        &mut self,
        target: Entity,
        offset: f32,
        randomize: bool,
        jitter_radius: f32,
        rng: &mut impl Rng,
    ) {
        assert!(
            offset.is_finite() && offset >= 0.0,
            "steering proxy needs a finite, non-negative stand-off distance, got {offset}"
        );

        self.target = Some(target);
        self.offset = offset;
        self.randomize = randomize;
        self.jitter = if randomize && jitter_radius > 0.0 {
            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(0.0..=jitter_radius);
            Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        } else {
            Vec3::ZERO
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Where to steer, given the real target's current position.
    pub fn goal(&self, target_position: Vec3) -> Vec3 {
        target_position + self.jitter
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_randomized(&self) -> bool {
        self.randomize
    }
}
